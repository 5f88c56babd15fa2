//! Lag-window forging.
//!
//! A one-step model sees the window `lags[k] = value at time target - 1 - k`.
//! When the target lies more than one step past the origin, the times after
//! the origin have not been observed yet and their values come from earlier,
//! strictly lower-horizon forecasts. Times before the start of the series are
//! filled by the [`BackfillPolicy`].

use crate::error::{ForecastError, Result};

/// How lag entries before time 0 are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackfillPolicy {
    /// Repeat the first observation.
    #[default]
    ReplicateFirst,
    /// Use zero.
    Zero,
}

impl BackfillPolicy {
    fn fill(self, first: f64) -> f64 {
        match self {
            Self::ReplicateFirst => first,
            Self::Zero => 0.0,
        }
    }
}

/// Assemble the lag window for `target` as seen from `origin`.
///
/// `forecasted(s, h)` must return the `h`-step forecast for time `s` issued
/// from `origin`; it is only called with `h < target - origin`.
pub fn forge<F>(
    target: usize,
    origin: usize,
    depth: usize,
    series: &[f64],
    policy: BackfillPolicy,
    mut forecasted: F,
) -> Result<Vec<f64>>
where
    F: FnMut(usize, usize) -> Result<f64>,
{
    if target <= origin {
        return Err(ForecastError::InvalidParameter(format!(
            "target {target} must lie after origin {origin}"
        )));
    }
    if origin >= series.len() {
        return Err(ForecastError::IndexOutOfBounds {
            index: origin,
            size: series.len(),
        });
    }

    let first = series[0];
    let mut lags = Vec::with_capacity(depth);
    for k in 0..depth {
        let value = match (target - 1).checked_sub(k) {
            None => policy.fill(first),
            Some(s) if s <= origin => series[s],
            Some(s) => forecasted(s, s - origin)?,
        };
        lags.push(value);
    }
    Ok(lags)
}

/// Lag window for a one-step forecast from `origin`, built from actuals only.
pub fn actual_lags(
    series: &[f64],
    origin: usize,
    depth: usize,
    policy: BackfillPolicy,
) -> Result<Vec<f64>> {
    forge(origin + 1, origin, depth, series, policy, |s, h| {
        Err(ForecastError::ComputationError(format!(
            "one-step window requested forecast ({s}, {h})"
        )))
    })
}
