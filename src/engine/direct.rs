//! Direct multi-horizon forecasting.
//!
//! Each origin produces all `H` forecasts in one call to a
//! [`MultiHorizonModel`]; no forecast feeds another, so the matrix is stored
//! with one row per origin.

use crate::core::{ForecastMatrix, RowConvention, Series};
use crate::engine::EngineConfig;
use crate::error::{ForecastError, Result};
use crate::models::{Forecastable, MultiHorizonModel};
use tracing::debug;

/// Drives a [`MultiHorizonModel`] over every origin of a series.
#[derive(Debug, Clone)]
pub struct DirectForecaster<M> {
    model: M,
    config: EngineConfig,
    matrix: Option<ForecastMatrix>,
}

impl<M: MultiHorizonModel> DirectForecaster<M> {
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

    fn horizons_from(&self, origin: usize, series: &Series) -> Result<Vec<f64>> {
        let forecasts = self.model.predict_horizons(origin, series.values())?;
        if forecasts.len() != self.config.horizon {
            return Err(ForecastError::DimensionMismatch {
                expected: self.config.horizon,
                got: forecasts.len(),
            });
        }
        Ok(forecasts)
    }

    fn run_pass(&mut self, series: &Series) -> Result<()> {
        let mut matrix =
            ForecastMatrix::allocate(series, self.config.horizon, RowConvention::Origin)?;
        if self.config.audit {
            matrix = matrix.with_access_audit();
        }
        for origin in 0..series.len() {
            let row = self.horizons_from(origin, series)?;
            matrix.write_row(origin, &row)?;
        }
        matrix.finish_rows();
        self.matrix = Some(matrix);
        Ok(())
    }

    /// Whether the cached matrix is a finished pass over exactly `series`.
    fn has_pass_for(&self, series: &Series) -> bool {
        self.matrix
            .as_ref()
            .is_some_and(|m| m.is_complete() && m.is_built_from(series))
    }
}

impl<M: MultiHorizonModel> Forecastable for DirectForecaster<M> {
    fn train(&mut self, window: &[f64]) -> Result<()> {
        let needed = self.model.min_train_len(self.config.horizon);
        if window.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: window.len(),
            });
        }
        self.model.train(window, self.config.horizon)?;
        self.matrix = None;
        Ok(())
    }

    fn predict(&self, origin: usize, series: &Series) -> Result<f64> {
        let forecasts = self.horizons_from(origin, series)?;
        forecasts
            .first()
            .copied()
            .ok_or(ForecastError::DimensionMismatch {
                expected: self.config.horizon,
                got: 0,
            })
    }

    fn forecast(&self, origin: usize, series: &Series) -> Result<Vec<f64>> {
        self.horizons_from(origin, series)
    }

    /// Horizon column `h` indexed by target time.
    ///
    /// The first call for a series runs the whole pass, since every origin
    /// yields all horizons at once; later calls read the cached matrix until
    /// the model is retrained or another series is passed.
    fn forecast_at(&mut self, h: usize, series: &Series) -> Result<Vec<Option<f64>>> {
        if h == 0 || h > self.config.horizon {
            return Err(ForecastError::InvalidHorizon {
                horizon: h,
                max: self.config.horizon,
            });
        }
        if !self.model.is_trained() {
            return Err(ForecastError::FitRequired);
        }
        if h == 1 || !self.has_pass_for(series) {
            self.run_pass(series)?;
        }
        self.matrix
            .as_ref()
            .ok_or(ForecastError::FitRequired)?
            .target_column(h)
    }

    fn forecast_all(&mut self, series: &Series) -> Result<&ForecastMatrix> {
        debug!(
            model = self.model.name(),
            horizon = self.config.horizon,
            observed = series.len(),
            "direct forecast pass"
        );
        self.run_pass(series)?;
        self.matrix.as_ref().ok_or(ForecastError::FitRequired)
    }

    fn matrix(&self) -> Option<&ForecastMatrix> {
        self.matrix.as_ref()
    }

    fn horizon(&self) -> usize {
        self.config.horizon
    }

    fn min_train_len(&self) -> usize {
        self.model.min_train_len(self.config.horizon)
    }

    fn parameter_count(&self) -> usize {
        self.model.parameter_count()
    }

    fn name(&self) -> &str {
        self.model.name()
    }
}
