//! Forecaster configuration.

use crate::engine::BackfillPolicy;
use crate::error::{ForecastError, Result};

/// Immutable settings of one forecaster instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum forecast horizon `H`.
    pub horizon: usize,
    /// Fill policy for lag entries before time 0.
    pub backfill: BackfillPolicy,
    /// Record forecast-matrix accesses for inspection.
    pub audit: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizon: 1,
            backfill: BackfillPolicy::ReplicateFirst,
            audit: false,
        }
    }
}

impl EngineConfig {
    /// Configuration for horizons `1..=horizon`.
    pub fn new(horizon: usize) -> Self {
        Self {
            horizon,
            ..Self::default()
        }
    }

    /// Set the backfill policy.
    pub fn with_backfill(mut self, backfill: BackfillPolicy) -> Self {
        self.backfill = backfill;
        self
    }

    /// Enable the forecast-matrix access audit.
    pub fn with_audit(mut self) -> Self {
        self.audit = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
