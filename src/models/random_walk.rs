//! Random walk model.
//!
//! Forecasts the last value, optionally plus a drift term estimated on the
//! training window. Recursively this yields `y[t] + h * drift` for horizon `h`.

use crate::error::{ForecastError, Result};
use crate::models::OneStepModel;

/// Random walk one-step model.
///
/// The one-step forecast is: y_hat\[t\] = y\[t-1\] + drift
#[derive(Debug, Clone, Default)]
pub struct RandomWalk {
    with_drift: bool,
    drift: Option<f64>,
}

impl RandomWalk {
    /// Random walk without drift.
    pub fn new() -> Self {
        Self::default()
    }

    /// Random walk with drift estimated from the training window.
    pub fn with_drift() -> Self {
        Self {
            with_drift: true,
            drift: None,
        }
    }

    /// Get the estimated drift parameter.
    pub fn drift(&self) -> Option<f64> {
        self.drift
    }
}

impl OneStepModel for RandomWalk {
    fn train(&mut self, window: &[f64]) -> Result<()> {
        let needed = self.min_train_len();
        if window.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: window.len(),
            });
        }

        // Average of first differences telescopes to the end-point slope.
        self.drift = Some(if self.with_drift {
            let n = window.len();
            (window[n - 1] - window[0]) / (n - 1) as f64
        } else {
            0.0
        });
        Ok(())
    }

    fn predict_lags(&self, _target: usize, lags: &[f64]) -> Result<f64> {
        let drift = self.drift.ok_or(ForecastError::FitRequired)?;
        let last = lags.first().ok_or(ForecastError::DimensionMismatch {
            expected: 1,
            got: 0,
        })?;
        Ok(last + drift)
    }

    fn lag_depth(&self) -> usize {
        1
    }

    fn min_train_len(&self) -> usize {
        if self.with_drift {
            2
        } else {
            1
        }
    }

    fn parameter_count(&self) -> usize {
        usize::from(self.with_drift)
    }

    fn is_trained(&self) -> bool {
        self.drift.is_some()
    }

    fn name(&self) -> &str {
        if self.with_drift {
            "RandomWalkWithDrift"
        } else {
            "RandomWalk"
        }
    }
}
