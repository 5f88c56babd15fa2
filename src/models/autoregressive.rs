//! Autoregressive AR(p) model estimated by least squares.
//!
//! y\[t\] = c + phi_1 * y\[t-1\] + ... + phi_p * y\[t-p\]

use crate::error::{ForecastError, Result};
use crate::models::OneStepModel;
use crate::utils::{lag_design, ols_fit, OLSResult};

/// AR(p) one-step model.
#[derive(Debug, Clone)]
pub struct AutoRegressive {
    p: usize,
    fit: Option<OLSResult>,
    name: String,
}

impl AutoRegressive {
    /// Create an AR model of order `p` (at least 1).
    pub fn new(p: usize) -> Self {
        let p = p.max(1);
        Self {
            p,
            fit: None,
            name: format!("AR({p})"),
        }
    }

    pub fn order(&self) -> usize {
        self.p
    }

    /// Lag coefficients `phi_1..phi_p`.
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.fit.as_ref().map(|f| f.coefficients.as_slice())
    }

    pub fn intercept(&self) -> Option<f64> {
        self.fit.as_ref().map(|f| f.intercept)
    }
}

impl OneStepModel for AutoRegressive {
    fn train(&mut self, window: &[f64]) -> Result<()> {
        let needed = self.min_train_len();
        if window.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: window.len(),
            });
        }

        let design = lag_design(window, self.p, 1)?;
        let fit = ols_fit(&design.features, &design.targets)?;
        // Swap in only a complete fit.
        self.fit = Some(fit);
        Ok(())
    }

    fn predict_lags(&self, _target: usize, lags: &[f64]) -> Result<f64> {
        let fit = self.fit.as_ref().ok_or(ForecastError::FitRequired)?;
        fit.predict_row(lags)
    }

    fn lag_depth(&self) -> usize {
        self.p
    }

    /// At least `p + 2` regression rows.
    fn min_train_len(&self) -> usize {
        2 * self.p + 2
    }

    fn parameter_count(&self) -> usize {
        self.p + 1
    }

    fn is_trained(&self) -> bool {
        self.fit.is_some()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
