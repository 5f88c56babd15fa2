//! Lagged design matrices for autoregressive fitting.

use crate::error::{ForecastError, Result};

/// Design rows and targets built from one series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LagDesign {
    /// `features[i][k]` is the value `k` steps before `origins[i]` (k = 0 is the origin).
    pub features: Vec<Vec<f64>>,
    /// Value `horizon` steps after each origin.
    pub targets: Vec<f64>,
    pub origins: Vec<usize>,
}

impl LagDesign {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Build the design pairing `lags` values ending at each origin with the value
/// `horizon` steps later.
///
/// Origins run from `lags - 1` to `n - 1 - horizon`, so every row uses
/// observed values only.
pub fn lag_design(series: &[f64], lags: usize, horizon: usize) -> Result<LagDesign> {
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "horizon must be at least 1".to_string(),
        ));
    }
    let first_origin = lags.saturating_sub(1);
    let needed = first_origin + horizon + 1;
    if series.len() < needed {
        return Err(ForecastError::InsufficientData {
            needed,
            got: series.len(),
        });
    }

    let mut design = LagDesign::default();
    for origin in first_origin..series.len() - horizon {
        design
            .features
            .push((0..lags).map(|k| series[origin - k]).collect());
        design.targets.push(series[origin + horizon]);
        design.origins.push(origin);
    }
    Ok(design)
}
