//! Rolling (walk-forward) validation.
//!
//! The series is split into a leading training part of `tr` points and a
//! test tail of `te` points. The validator fits the model on the training
//! part, then walks through the tail one point at a time, forecasting each
//! point from the one before it and retraining every `retrain_cycle` steps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::{Aligned, Series};
use crate::error::{ForecastError, Result};
use crate::models::{Forecastable, ModelRegistry};
use crate::validation::diagnostics::{diagnose, FitStatistics};
use tracing::{debug, info, warn};

/// Configuration for rolling validation.
#[derive(Debug, Clone)]
pub struct RollingConfig {
    /// Share of the series held out as the test tail, in (0, 1).
    pub test_fraction: f64,
    /// Retrain every this many test steps; otherwise reuse the last fit.
    pub retrain_cycle: usize,
    /// Keep the training window anchored at 0 instead of sliding it.
    pub growing_window: bool,
    /// Also accumulate forecasts for every horizon up to the model's `H`.
    pub multi_horizon: bool,
    /// Cooperative cancellation flag, checked before every step.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            retrain_cycle: 1,
            growing_window: false,
            multi_horizon: false,
            cancel: None,
        }
    }
}

impl RollingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the held-out fraction.
    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    /// Set the retraining cadence.
    pub fn with_retrain_cycle(mut self, cycle: usize) -> Self {
        self.retrain_cycle = cycle;
        self
    }

    /// Use a growing (`true`) or sliding (`false`) training window.
    pub fn with_growing_window(mut self, growing: bool) -> Self {
        self.growing_window = growing;
        self
    }

    pub fn with_multi_horizon(mut self, multi_horizon: bool) -> Self {
        self.multi_horizon = multi_horizon;
        self
    }

    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "test_fraction must lie in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.retrain_cycle == 0 {
            return Err(ForecastError::InvalidParameter(
                "retrain_cycle must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Training and test sizes `(tr, te)` for a series of length `m`.
    pub fn split(&self, m: usize) -> Result<(usize, usize)> {
        self.validate()?;
        let te = (m as f64 * self.test_fraction).round() as usize;
        if te < 2 {
            return Err(ForecastError::InsufficientData {
                needed: (2.0 / self.test_fraction).ceil() as usize,
                got: m,
            });
        }
        if te >= m {
            return Err(ForecastError::InsufficientData {
                needed: te + 1,
                got: m,
            });
        }
        Ok((m - te, te))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Position of a [`RollingValidator`] in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollingState {
    /// Initial fit on the training part pending.
    Seed,
    /// Test step `i` pending, `1 <= i < te`.
    Step(usize),
    /// Test tail exhausted.
    Done,
}

/// Record of one test step.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingStep {
    pub index: usize,
    pub window_start: usize,
    pub window_end: usize,
    pub retrained: bool,
    pub origin: usize,
    /// One-step forecast for `origin + 1`.
    pub forecast: f64,
}

/// Outcome of a rolling validation run.
#[derive(Debug, Clone)]
pub struct RollingReport {
    pub model: String,
    pub train_size: usize,
    pub test_size: usize,
    /// Training calls, the seed fit included.
    pub retrains: usize,
    pub steps: Vec<RollingStep>,
    /// One-step forecasts aligned with `series[tr + 1..m]`.
    pub one_step: Aligned,
    /// Horizon `h` accumulator at index `h - 1`; empty unless multi-horizon.
    pub horizons: Vec<Aligned>,
    /// Fit statistics of the one-step accumulator.
    pub statistics: FitStatistics,
    /// Fit statistics per horizon; `None` where no target fell inside the series.
    pub horizon_statistics: Vec<Option<FitStatistics>>,
}

/// Walk-forward validator over one model and one series.
pub struct RollingValidator<'a, F: Forecastable + ?Sized> {
    model: &'a mut F,
    series: &'a Series,
    config: &'a RollingConfig,
    state: RollingState,
    train_size: usize,
    test_size: usize,
    retrains: usize,
    steps: Vec<RollingStep>,
    one_step: Aligned,
    horizons: Vec<Aligned>,
}

impl<'a, F: Forecastable + ?Sized> RollingValidator<'a, F> {
    pub fn new(model: &'a mut F, series: &'a Series, config: &'a RollingConfig) -> Result<Self> {
        let (train_size, test_size) = config.split(series.len())?;
        let needed = model.min_train_len();
        if train_size < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: train_size,
            });
        }

        let horizons = if config.multi_horizon {
            vec![Aligned::new(); model.horizon()]
        } else {
            Vec::new()
        };

        Ok(Self {
            model,
            series,
            config,
            state: RollingState::Seed,
            train_size,
            test_size,
            retrains: 0,
            steps: Vec::with_capacity(test_size - 1),
            one_step: Aligned::new(),
            horizons,
        })
    }

    pub fn state(&self) -> RollingState {
        self.state
    }

    pub fn train_size(&self) -> usize {
        self.train_size
    }

    pub fn test_size(&self) -> usize {
        self.test_size
    }

    pub fn retrains(&self) -> usize {
        self.retrains
    }

    /// Advance one transition and return the new state.
    pub fn step(&mut self) -> Result<RollingState> {
        if self.state == RollingState::Done {
            return Ok(RollingState::Done);
        }
        if self.config.is_cancelled() {
            return Err(ForecastError::Cancelled);
        }

        self.state = match self.state {
            RollingState::Seed => {
                self.retrain(0, 0, self.train_size)?;
                self.after(0)
            }
            RollingState::Step(i) => {
                self.test_step(i)?;
                self.after(i)
            }
            RollingState::Done => RollingState::Done,
        };
        Ok(self.state)
    }

    /// Drive the state machine to `Done` and summarize.
    pub fn run(mut self) -> Result<RollingReport> {
        while self.step()? != RollingState::Done {}
        self.finish()
    }

    fn after(&self, i: usize) -> RollingState {
        if i + 1 < self.test_size {
            RollingState::Step(i + 1)
        } else {
            RollingState::Done
        }
    }

    fn retrain(&mut self, i: usize, start: usize, end: usize) -> Result<()> {
        debug!(
            model = self.model.name(),
            step = i,
            window_start = start,
            window_end = end,
            "retraining"
        );
        let window = &self.series.values()[start..end];
        if let Err(e) = self.model.train(window) {
            warn!(
                model = self.model.name(),
                step = i,
                window_start = start,
                window_end = end,
                error = %e,
                "retrain failed, aborting rolling validation"
            );
            return Err(e);
        }
        self.retrains += 1;
        Ok(())
    }

    fn test_step(&mut self, i: usize) -> Result<()> {
        let window_start = if self.config.growing_window { 0 } else { i };
        let window_end = self.train_size + i;
        let retrained = i % self.config.retrain_cycle == 0;
        if retrained {
            self.retrain(i, window_start, window_end)?;
        }

        let origin = window_end - 1;
        let target = window_end;
        let values = self.series.values();
        let forecast = self.model.predict(origin, self.series)?;
        self.one_step.push(target, values[target], forecast);

        if self.config.multi_horizon {
            let path = self.model.forecast(origin, self.series)?;
            for (acc, (k, value)) in self.horizons.iter_mut().zip(path.into_iter().enumerate()) {
                let t = origin + k + 1;
                if let Some(&actual) = values.get(t) {
                    acc.push(t, actual, value);
                }
            }
        }

        self.steps.push(RollingStep {
            index: i,
            window_start,
            window_end,
            retrained,
            origin,
            forecast,
        });
        Ok(())
    }

    fn finish(self) -> Result<RollingReport> {
        let dof = self.model.degrees_of_freedom(self.one_step.len());
        let statistics = diagnose(&self.one_step.actual, &self.one_step.forecast, dof)?;
        let horizon_statistics = self
            .horizons
            .iter()
            .map(|acc| {
                if acc.is_empty() {
                    return Ok(None);
                }
                let dof = self.model.degrees_of_freedom(acc.len());
                diagnose(&acc.actual, &acc.forecast, dof).map(Some)
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            model = self.model.name(),
            steps = self.steps.len(),
            retrains = self.retrains,
            rmse = statistics.rmse,
            "rolling validation complete"
        );

        Ok(RollingReport {
            model: self.model.name().to_string(),
            train_size: self.train_size,
            test_size: self.test_size,
            retrains: self.retrains,
            steps: self.steps,
            one_step: self.one_step,
            horizons: self.horizons,
            statistics,
            horizon_statistics,
        })
    }
}

/// Run rolling validation of `model` over `series`.
pub fn rolling_validate<F: Forecastable + ?Sized>(
    model: &mut F,
    series: &Series,
    config: &RollingConfig,
) -> Result<RollingReport> {
    RollingValidator::new(model, series, config)?.run()
}

/// Run rolling validation for every registered model, each on a fresh instance.
///
/// A failing model does not stop the others; its error is returned in place
/// of its report.
pub fn rolling_validate_all(
    registry: &ModelRegistry,
    series: &Series,
    config: &RollingConfig,
) -> Vec<(&'static str, Result<RollingReport>)> {
    registry
        .iter()
        .map(|spec| {
            let mut model = spec.create();
            (spec.name, rolling_validate(model.as_mut(), series, config))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineConfig, RecursiveForecaster};
    use crate::models::{AutoRegressive, ModelSpec, OneStepModel, RandomWalk};
    use approx::assert_relative_eq;

    /// Random walk that records every training window it sees.
    #[derive(Debug, Default, Clone)]
    struct Recording {
        inner: RandomWalk,
        windows: Vec<usize>,
    }

    impl OneStepModel for Recording {
        fn train(&mut self, window: &[f64]) -> Result<()> {
            self.windows.push(window.len());
            self.inner.train(window)
        }

        fn predict_lags(&self, target: usize, lags: &[f64]) -> Result<f64> {
            self.inner.predict_lags(target, lags)
        }

        fn lag_depth(&self) -> usize {
            1
        }

        fn parameter_count(&self) -> usize {
            0
        }

        fn is_trained(&self) -> bool {
            self.inner.is_trained()
        }

        fn name(&self) -> &str {
            "Recording"
        }
    }

    fn linear(n: usize) -> Series {
        Series::new((0..n).map(|i| i as f64).collect()).unwrap()
    }

    fn random_walk(h: usize) -> RecursiveForecaster<RandomWalk> {
        RecursiveForecaster::new(RandomWalk::new(), EngineConfig::new(h)).unwrap()
    }

    #[test]
    fn config_defaults_and_validation() {
        let config = RollingConfig::default();
        assert_relative_eq!(config.test_fraction, 0.2);
        assert_eq!(config.retrain_cycle, 1);
        assert!(!config.growing_window);
        assert!(config.validate().is_ok());

        assert!(RollingConfig::new().with_test_fraction(0.0).validate().is_err());
        assert!(RollingConfig::new().with_test_fraction(1.0).validate().is_err());
        assert!(RollingConfig::new().with_retrain_cycle(0).validate().is_err());
    }

    #[test]
    fn split_sizes() {
        let config = RollingConfig::new().with_test_fraction(0.3);
        assert_eq!(config.split(100).unwrap(), (70, 30));
        assert_eq!(config.split(10).unwrap(), (7, 3));
        assert!(matches!(
            config.split(3),
            Err(ForecastError::InsufficientData { .. })
        ));
    }

    #[test]
    fn state_machine_walks_seed_steps_done() {
        let y = linear(10);
        let config = RollingConfig::new().with_test_fraction(0.3);
        let mut model = random_walk(1);
        let mut validator = RollingValidator::new(&mut model, &y, &config).unwrap();

        assert_eq!(validator.state(), RollingState::Seed);
        assert_eq!(validator.step().unwrap(), RollingState::Step(1));
        assert_eq!(validator.retrains(), 1);
        assert_eq!(validator.step().unwrap(), RollingState::Step(2));
        assert_eq!(validator.step().unwrap(), RollingState::Done);
        assert_eq!(validator.step().unwrap(), RollingState::Done);

        let report = validator.run().unwrap();
        assert_eq!(report.steps.len(), 2);
        assert_eq!(report.one_step.targets, vec![8, 9]);
        assert_eq!(report.one_step.forecast, vec![7.0, 8.0]);
    }

    #[test]
    fn sliding_window_keeps_its_length() {
        let y = linear(20);
        let config = RollingConfig::new().with_test_fraction(0.25);
        let mut model =
            RecursiveForecaster::new(Recording::default(), EngineConfig::new(1)).unwrap();
        let report = rolling_validate(&mut model, &y, &config).unwrap();

        assert_eq!(report.retrains, 5);
        assert!(model.model().windows.iter().all(|&len| len == 15));
        for step in &report.steps {
            assert_eq!(step.window_start, step.index);
            assert_eq!(step.window_end - step.window_start, 15);
            assert_eq!(step.origin, step.window_end - 1);
        }
    }

    #[test]
    fn growing_window_stays_anchored() {
        let y = linear(20);
        let config = RollingConfig::new()
            .with_test_fraction(0.25)
            .with_growing_window(true)
            .with_retrain_cycle(2);
        let mut model =
            RecursiveForecaster::new(Recording::default(), EngineConfig::new(1)).unwrap();
        let report = rolling_validate(&mut model, &y, &config).unwrap();

        // Seed plus steps 2 and 4.
        assert_eq!(report.retrains, 3);
        assert_eq!(model.model().windows, vec![15, 17, 19]);
        assert!(report.steps.iter().all(|s| s.window_start == 0));
        let retrained: Vec<bool> = report.steps.iter().map(|s| s.retrained).collect();
        assert_eq!(retrained, vec![false, true, false, true]);
    }

    #[test]
    fn multi_horizon_accumulators_stop_at_series_end() {
        let y = linear(20);
        let config = RollingConfig::new()
            .with_test_fraction(0.25)
            .with_multi_horizon(true);
        let mut model = random_walk(3);
        let report = rolling_validate(&mut model, &y, &config).unwrap();

        assert_eq!(report.horizons.len(), 3);
        assert_eq!(report.horizons[0].len(), 4);
        assert_eq!(report.horizons[1].len(), 3);
        assert_eq!(report.horizons[2].len(), 2);
        assert_eq!(report.horizons[2].targets, vec![18, 19]);
        // Random walk on a unit trend misses by h.
        assert_relative_eq!(report.horizon_statistics[2].as_ref().unwrap().mae, 3.0);
        assert_relative_eq!(report.statistics.mae, 1.0);
    }

    #[test]
    fn training_part_shorter_than_model_needs_is_rejected() {
        let y = linear(10);
        let config = RollingConfig::new().with_test_fraction(0.3);
        let mut model =
            RecursiveForecaster::new(AutoRegressive::new(4), EngineConfig::new(1)).unwrap();
        assert_eq!(
            RollingValidator::new(&mut model, &y, &config).err(),
            Some(ForecastError::InsufficientData { needed: 10, got: 7 })
        );
    }

    #[test]
    fn retrain_failure_aborts() {
        #[derive(Debug, Default)]
        struct FailsLater {
            calls: usize,
            inner: RandomWalk,
        }

        impl OneStepModel for FailsLater {
            fn train(&mut self, window: &[f64]) -> Result<()> {
                self.calls += 1;
                if self.calls > 1 {
                    return Err(ForecastError::InsufficientData {
                        needed: 100,
                        got: window.len(),
                    });
                }
                self.inner.train(window)
            }

            fn predict_lags(&self, target: usize, lags: &[f64]) -> Result<f64> {
                self.inner.predict_lags(target, lags)
            }

            fn lag_depth(&self) -> usize {
                1
            }

            fn parameter_count(&self) -> usize {
                0
            }

            fn is_trained(&self) -> bool {
                true
            }

            fn name(&self) -> &str {
                "FailsLater"
            }
        }

        let y = linear(20);
        let config = RollingConfig::new().with_test_fraction(0.25);
        let mut model = RecursiveForecaster::new(FailsLater::default(), EngineConfig::new(1)).unwrap();
        let result = rolling_validate(&mut model, &y, &config);
        assert!(matches!(
            result,
            Err(ForecastError::InsufficientData { needed: 100, .. })
        ));
    }

    #[test]
    fn cancellation_is_checked_before_each_step() {
        let y = linear(20);
        let flag = Arc::new(AtomicBool::new(false));
        let config = RollingConfig::new().with_cancellation(flag.clone());
        let mut model = random_walk(1);
        let mut validator = RollingValidator::new(&mut model, &y, &config).unwrap();

        validator.step().unwrap();
        flag.store(true, Ordering::Relaxed);
        assert_eq!(validator.step(), Err(ForecastError::Cancelled));
    }

    #[test]
    fn validate_all_uses_fresh_instances() {
        let mut registry = ModelRegistry::new();
        registry.register(ModelSpec::with_horizon(
            "RandomWalk",
            |h| Box::new(random_walk(h)),
            1,
        ));
        registry.register(ModelSpec::new("AR(8)", || {
            Box::new(RecursiveForecaster::new(AutoRegressive::new(8), EngineConfig::new(1)).unwrap())
        }));

        let y = linear(20);
        let results = rolling_validate_all(&registry, &y, &RollingConfig::default());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "RandomWalk");
        assert_eq!(results[0].1.as_ref().unwrap().steps.len(), 3);
        assert!(matches!(
            results[1].1,
            Err(ForecastError::InsufficientData { .. })
        ));
    }
}
