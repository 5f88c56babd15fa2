//! Recursive multi-horizon forecasting.
//!
//! Horizon `h` forecasts are produced by feeding the forecasts of horizons
//! `< h` back in where actuals are not yet available. Columns are filled in
//! ascending horizon order, so every cell only depends on cells that are
//! already final.

use crate::core::{ForecastMatrix, RowConvention, Series};
use crate::engine::{actual_lags, forge, EngineConfig};
use crate::error::{ForecastError, Result};
use crate::models::{Forecastable, OneStepModel};
use tracing::{debug, trace};

/// Drives a [`OneStepModel`] over all horizons `1..=H`.
#[derive(Debug, Clone)]
pub struct RecursiveForecaster<M> {
    model: M,
    config: EngineConfig,
    matrix: Option<ForecastMatrix>,
}

impl<M: OneStepModel> RecursiveForecaster<M> {
    pub fn new(model: M, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            model,
            config,
            matrix: None,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    fn check_horizon(&self, h: usize) -> Result<()> {
        if h == 0 || h > self.config.horizon {
            return Err(ForecastError::InvalidHorizon {
                horizon: h,
                max: self.config.horizon,
            });
        }
        Ok(())
    }

    /// Start a pass at horizon 1, or check that horizon `h` is next.
    fn prepare_pass(&mut self, h: usize, series: &Series) -> Result<()> {
        if h == 1 {
            let matrix =
                ForecastMatrix::allocate(series, self.config.horizon, RowConvention::Target)?;
            self.matrix = Some(if self.config.audit {
                matrix.with_access_audit()
            } else {
                matrix
            });
            return Ok(());
        }

        let matrix = self.matrix.as_ref().ok_or(ForecastError::HorizonOrder {
            requested: h,
            next: 1,
        })?;
        if matrix.observed() != series.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: matrix.observed(),
                got: series.len(),
            });
        }
        if !matrix.is_built_from(series) {
            return Err(ForecastError::InvalidParameter(format!(
                "horizon {h} requested for a series other than the one this pass started on"
            )));
        }
        if matrix.next_horizon() != h {
            return Err(ForecastError::HorizonOrder {
                requested: h,
                next: matrix.next_horizon(),
            });
        }
        Ok(())
    }
}

/// Compute horizon column `h` against the lower columns already in `matrix`.
fn sweep_column<M: OneStepModel>(
    model: &M,
    matrix: &ForecastMatrix,
    config: &EngineConfig,
    h: usize,
    values: &[f64],
) -> Result<Vec<Option<f64>>> {
    let depth = model.lag_depth();
    (0..matrix.rows())
        .map(|t| {
            if !matrix.is_knowable(t, h) {
                return Ok(None);
            }
            let origin = t - h;
            let lags = forge(t, origin, depth, values, config.backfill, |s, hh| {
                matrix.read_forecast(s, hh)
            })?;
            model.predict_lags(t, &lags).map(Some)
        })
        .collect()
}

impl<M: OneStepModel> Forecastable for RecursiveForecaster<M> {
    fn train(&mut self, window: &[f64]) -> Result<()> {
        let needed = self.model.min_train_len();
        if window.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: window.len(),
            });
        }
        self.model.train(window)?;
        // Forecasts of the previous fit must not mix with the new one.
        self.matrix = None;
        Ok(())
    }

    fn predict(&self, origin: usize, series: &Series) -> Result<f64> {
        let lags = actual_lags(
            series.values(),
            origin,
            self.model.lag_depth(),
            self.config.backfill,
        )?;
        self.model.predict_lags(origin + 1, &lags)
    }

    fn forecast(&self, origin: usize, series: &Series) -> Result<Vec<f64>> {
        let values = series.values();
        let depth = self.model.lag_depth();
        // path[k] is the (k + 1)-step forecast from origin.
        let mut path: Vec<f64> = Vec::with_capacity(self.config.horizon);
        for h in 1..=self.config.horizon {
            let target = origin + h;
            let lags = forge(target, origin, depth, values, self.config.backfill, |s, hh| {
                path.get(hh - 1).copied().ok_or_else(|| {
                    ForecastError::ComputationError(format!(
                        "forecast for time {s} at horizon {hh} not yet available"
                    ))
                })
            })?;
            let next = self.model.predict_lags(target, &lags)?;
            path.push(next);
        }
        Ok(path)
    }

    fn forecast_at(&mut self, h: usize, series: &Series) -> Result<Vec<Option<f64>>> {
        self.check_horizon(h)?;
        if !self.model.is_trained() {
            return Err(ForecastError::FitRequired);
        }
        self.prepare_pass(h, series)?;

        let matrix = self.matrix.as_ref().ok_or(ForecastError::FitRequired)?;
        let column = sweep_column(&self.model, matrix, &self.config, h, series.values())?;
        trace!(
            model = self.model.name(),
            horizon = h,
            filled = column.iter().filter(|c| c.is_some()).count(),
            "horizon column swept"
        );

        let matrix = self.matrix.as_mut().ok_or(ForecastError::FitRequired)?;
        matrix.write_column(h, column.clone())?;
        Ok(column)
    }

    fn forecast_all(&mut self, series: &Series) -> Result<&ForecastMatrix> {
        debug!(
            model = self.model.name(),
            horizon = self.config.horizon,
            observed = series.len(),
            "recursive forecast pass"
        );
        for h in 1..=self.config.horizon {
            self.forecast_at(h, series)?;
        }
        self.matrix.as_ref().ok_or(ForecastError::FitRequired)
    }

    fn matrix(&self) -> Option<&ForecastMatrix> {
        self.matrix.as_ref()
    }

    fn horizon(&self) -> usize {
        self.config.horizon
    }

    fn min_train_len(&self) -> usize {
        self.model.min_train_len()
    }

    fn parameter_count(&self) -> usize {
        self.model.parameter_count()
    }

    fn name(&self) -> &str {
        self.model.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Access;
    use crate::engine::BackfillPolicy;
    use crate::models::{AutoRegressive, RandomWalk};
    use approx::assert_relative_eq;

    /// y[t] = 0.5 y[t-1] + 0.25 y[t-2] + 1, with fixed coefficients.
    #[derive(Debug, Clone)]
    struct FixedAr2;

    impl OneStepModel for FixedAr2 {
        fn train(&mut self, _window: &[f64]) -> Result<()> {
            Ok(())
        }

        fn predict_lags(&self, _target: usize, lags: &[f64]) -> Result<f64> {
            Ok(1.0 + 0.5 * lags[0] + 0.25 * lags[1])
        }

        fn lag_depth(&self) -> usize {
            2
        }

        fn parameter_count(&self) -> usize {
            3
        }

        fn is_trained(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "FixedAR2"
        }
    }

    fn series(values: &[f64]) -> Series {
        Series::new(values.to_vec()).unwrap()
    }

    fn trained_random_walk(horizon: usize) -> RecursiveForecaster<RandomWalk> {
        let mut f = RecursiveForecaster::new(RandomWalk::new(), EngineConfig::new(horizon)).unwrap();
        f.train(&[0.0]).unwrap();
        f
    }

    #[test]
    fn random_walk_matrix_shifts_actuals() {
        let y = series(&[1.0, 3.0, 4.0, 2.0, 5.0]);
        let mut f = trained_random_walk(2);
        let matrix = f.forecast_all(&y).unwrap();

        assert_eq!(matrix.get(0, 1).unwrap(), None);
        assert_eq!(matrix.get(3, 1).unwrap(), Some(4.0));
        assert_eq!(matrix.get(5, 1).unwrap(), Some(5.0));
        assert_eq!(matrix.get(6, 1).unwrap(), None);
        assert_eq!(matrix.get(1, 2).unwrap(), None);
        assert_eq!(matrix.get(4, 2).unwrap(), Some(4.0));
        assert_eq!(matrix.get(6, 2).unwrap(), Some(5.0));
        assert!(matrix.is_complete());
    }

    #[test]
    fn fixed_ar2_recursion_by_hand() {
        let y = series(&[2.0, 4.0, 6.0]);
        let mut f = RecursiveForecaster::new(FixedAr2, EngineConfig::new(3)).unwrap();
        let matrix = f.forecast_all(&y).unwrap();

        // Origin 2: one step uses actuals 6, 4.
        let f1 = 1.0 + 0.5 * 6.0 + 0.25 * 4.0;
        // Two steps: forecast f1 then actual 6.
        let f2 = 1.0 + 0.5 * f1 + 0.25 * 6.0;
        // Three steps: two earlier forecasts.
        let f3 = 1.0 + 0.5 * f2 + 0.25 * f1;

        assert_relative_eq!(matrix.get(3, 1).unwrap().unwrap(), f1, epsilon = 1e-12);
        assert_relative_eq!(matrix.get(4, 2).unwrap().unwrap(), f2, epsilon = 1e-12);
        assert_relative_eq!(matrix.get(5, 3).unwrap().unwrap(), f3, epsilon = 1e-12);

        let path = f.forecast(2, &y).unwrap();
        assert_relative_eq!(path[0], f1, epsilon = 1e-12);
        assert_relative_eq!(path[1], f2, epsilon = 1e-12);
        assert_relative_eq!(path[2], f3, epsilon = 1e-12);
    }

    #[test]
    fn early_rows_use_backfill_policy() {
        let y = series(&[2.0, 4.0, 6.0]);

        let mut replicate = RecursiveForecaster::new(FixedAr2, EngineConfig::new(1)).unwrap();
        let m = replicate.forecast_all(&y).unwrap();
        // Target 1 from origin 0: lags [2, backfill 2].
        assert_relative_eq!(m.get(1, 1).unwrap().unwrap(), 1.0 + 1.0 + 0.5, epsilon = 1e-12);

        let config = EngineConfig::new(1).with_backfill(BackfillPolicy::Zero);
        let mut zero = RecursiveForecaster::new(FixedAr2, config).unwrap();
        let m = zero.forecast_all(&y).unwrap();
        assert_relative_eq!(m.get(1, 1).unwrap().unwrap(), 1.0 + 1.0, epsilon = 1e-12);
    }

    #[test]
    fn horizon_one_matches_predict() {
        let y = series(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0]);
        let mut f = RecursiveForecaster::new(FixedAr2, EngineConfig::new(2)).unwrap();
        let column = f.forecast_at(1, &y).unwrap();

        for t in 1..=y.len() {
            let expected = f.predict(t - 1, &y).unwrap();
            assert_relative_eq!(column[t].unwrap(), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn columns_out_of_order_are_rejected() {
        let y = series(&[1.0, 2.0, 3.0, 4.0]);
        let mut f = trained_random_walk(3);

        assert!(matches!(
            f.forecast_at(2, &y),
            Err(ForecastError::HorizonOrder {
                requested: 2,
                next: 1
            })
        ));
        f.forecast_at(1, &y).unwrap();
        assert!(matches!(
            f.forecast_at(3, &y),
            Err(ForecastError::HorizonOrder {
                requested: 3,
                next: 2
            })
        ));
        assert!(matches!(
            f.forecast_at(2, &series(&[1.0, 2.0])),
            Err(ForecastError::DimensionMismatch { .. })
        ));
        assert!(f.forecast_at(2, &y).is_ok());
    }

    #[test]
    fn invalid_horizons_fail_fast() {
        let y = series(&[1.0, 2.0]);
        let mut f = trained_random_walk(2);
        assert_eq!(
            f.forecast_at(0, &y),
            Err(ForecastError::InvalidHorizon { horizon: 0, max: 2 })
        );
        assert_eq!(
            f.forecast_at(3, &y),
            Err(ForecastError::InvalidHorizon { horizon: 3, max: 2 })
        );
        assert!(RecursiveForecaster::new(RandomWalk::new(), EngineConfig::new(0)).is_err());
    }

    #[test]
    fn audit_shows_reads_only_of_finished_horizons() {
        let y = series(&[1.0, 2.0, 4.0, 8.0, 16.0, 32.0]);
        let config = EngineConfig::new(4).with_audit();
        let mut f = RecursiveForecaster::new(FixedAr2, config).unwrap();
        let matrix = f.forecast_all(&y).unwrap();
        let log = matrix.access_log().unwrap();

        let mut written = 0;
        let mut reads = 0;
        for access in log {
            match access {
                Access::Read { h, .. } => {
                    assert!(h <= written, "read horizon {h} before it was written");
                    reads += 1;
                }
                Access::WriteColumn { h } => {
                    assert_eq!(h, written + 1);
                    written = h;
                }
                Access::WriteRow { .. } => panic!("recursive pass wrote a row"),
            }
        }
        assert_eq!(written, 4);
        assert!(reads > 0);
    }

    #[test]
    fn untrained_model_propagates_fit_required() {
        let y = series(&[1.0, 2.0, 3.0]);
        let mut f = RecursiveForecaster::new(RandomWalk::new(), EngineConfig::new(2)).unwrap();
        assert_eq!(f.predict(1, &y), Err(ForecastError::FitRequired));
        assert!(matches!(
            f.forecast_all(&y),
            Err(ForecastError::FitRequired)
        ));
    }

    #[test]
    fn training_checks_window_length() {
        let mut f = RecursiveForecaster::new(AutoRegressive::new(2), EngineConfig::new(2)).unwrap();
        assert_eq!(
            f.train(&[1.0, 2.0, 3.0]),
            Err(ForecastError::InsufficientData { needed: 6, got: 3 })
        );
        assert_eq!(f.min_train_len(), 6);
        assert_eq!(f.parameter_count(), 3);
        assert_eq!(f.name(), "AR(2)");
    }

    #[test]
    fn retraining_discards_the_running_pass() {
        let y = series(&[0.0, 2.0, 4.0, 6.0]);
        let mut f = RecursiveForecaster::new(RandomWalk::with_drift(), EngineConfig::new(2)).unwrap();
        f.train(&[0.0, 1.0]).unwrap();
        let old = f.forecast_at(1, &y).unwrap();
        assert_eq!(old[4], Some(7.0));

        f.train(&[0.0, -10.0]).unwrap();
        assert!(f.matrix().is_none());
        assert!(matches!(
            f.forecast_at(2, &y),
            Err(ForecastError::HorizonOrder {
                requested: 2,
                next: 1
            })
        ));

        let fresh = f.forecast_at(1, &y).unwrap();
        assert_eq!(fresh[4], Some(-4.0));
        let h2 = f.forecast_at(2, &y).unwrap();
        assert_eq!(h2[5], Some(-14.0));
    }

    #[test]
    fn failed_retrain_keeps_the_previous_matrix() {
        let y = series(&[1.0, 2.0, 3.0]);
        let mut f = trained_random_walk(2);
        f.forecast_at(1, &y).unwrap();

        assert!(f.train(&[]).is_err());
        assert_eq!(f.matrix().unwrap().next_horizon(), 2);
        assert!(f.forecast_at(2, &y).is_ok());
    }

    #[test]
    fn pass_cannot_switch_series_between_horizons() {
        let a = series(&[1.0, 2.0, 3.0, 4.0]);
        let b = series(&[4.0, 3.0, 2.0, 1.0]);
        let mut f = trained_random_walk(2);
        f.forecast_at(1, &a).unwrap();

        assert!(matches!(
            f.forecast_at(2, &b),
            Err(ForecastError::InvalidParameter(_))
        ));
        let h2 = f.forecast_at(2, &a).unwrap();
        assert_eq!(h2[5], Some(4.0));
    }

    #[test]
    fn untrained_model_fails_before_allocating() {
        let y = series(&[1.0, 2.0, 3.0]);
        let mut f = RecursiveForecaster::new(RandomWalk::new(), EngineConfig::new(2)).unwrap();
        assert_eq!(f.forecast_at(1, &y), Err(ForecastError::FitRequired));
        assert!(f.matrix().is_none());
    }

    #[test]
    fn actual_column_is_untouched() {
        let values = [5.0, 3.0, 8.0, 1.0, 7.0, 2.0];
        let y = series(&values);
        let mut f = RecursiveForecaster::new(FixedAr2, EngineConfig::new(3)).unwrap();
        let matrix = f.forecast_all(&y).unwrap();
        for (t, v) in values.iter().enumerate() {
            assert_eq!(matrix.actual(t), Some(*v));
        }
        for t in values.len()..matrix.rows() {
            assert_eq!(matrix.actual(t), None);
        }
    }
}
