//! Direct multi-horizon autoregression.
//!
//! One least-squares head per horizon, all sharing the same lag features:
//! y\[o+h\] = c_h + sum_k phi_{h,k} * y\[o-k\], for h = 1..=H.
//! Heads never see each other's forecasts.

use crate::engine::{actual_lags, BackfillPolicy};
use crate::error::{ForecastError, Result};
use crate::models::MultiHorizonModel;
use crate::utils::{lag_design, ols_fit, OLSResult};

/// Direct AR(p) model with `H` independent regression heads.
#[derive(Debug, Clone)]
pub struct DirectAutoRegressive {
    p: usize,
    backfill: BackfillPolicy,
    heads: Vec<OLSResult>,
    name: String,
}

impl DirectAutoRegressive {
    pub fn new(p: usize) -> Self {
        let p = p.max(1);
        Self {
            p,
            backfill: BackfillPolicy::default(),
            heads: Vec::new(),
            name: format!("DirectAR({p})"),
        }
    }

    /// Fill policy for origins with fewer than `p` observations behind them.
    pub fn with_backfill(mut self, backfill: BackfillPolicy) -> Self {
        self.backfill = backfill;
        self
    }

    pub fn order(&self) -> usize {
        self.p
    }

    /// Fitted head for horizon `h`.
    pub fn head(&self, h: usize) -> Option<&OLSResult> {
        h.checked_sub(1).and_then(|i| self.heads.get(i))
    }

    pub fn heads(&self) -> usize {
        self.heads.len()
    }
}

impl MultiHorizonModel for DirectAutoRegressive {
    fn train(&mut self, window: &[f64], horizon: usize) -> Result<()> {
        let needed = self.min_train_len(horizon);
        if window.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: window.len(),
            });
        }

        let heads = (1..=horizon)
            .map(|h| {
                let design = lag_design(window, self.p, h)?;
                ols_fit(&design.features, &design.targets)
            })
            .collect::<Result<Vec<_>>>()?;
        self.heads = heads;
        Ok(())
    }

    fn predict_horizons(&self, origin: usize, series: &[f64]) -> Result<Vec<f64>> {
        if self.heads.is_empty() {
            return Err(ForecastError::FitRequired);
        }
        let lags = actual_lags(series, origin, self.p, self.backfill)?;
        self.heads.iter().map(|head| head.predict_row(&lags)).collect()
    }

    /// The longest head still needs `p + 2` regression rows.
    fn min_train_len(&self, horizon: usize) -> usize {
        2 * self.p + horizon.max(1) + 1
    }

    fn parameter_count(&self) -> usize {
        self.heads.len().max(1) * (self.p + 1)
    }

    fn is_trained(&self) -> bool {
        !self.heads.is_empty()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
