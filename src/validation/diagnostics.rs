//! Fit statistics over aligned actual/forecast vectors.

use crate::error::{ForecastError, Result};
use crate::models::DegreesOfFreedom;

/// Quality-of-fit statistics in a fixed, named order.
#[derive(Debug, Clone, PartialEq)]
pub struct FitStatistics {
    /// Number of aligned pairs.
    pub n: usize,
    /// Degrees of freedom used by the model.
    pub df_model: usize,
    /// Residual degrees of freedom.
    pub df_residual: usize,
    /// Sum of squared errors.
    pub sse: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
    /// Mean Absolute Percentage Error (None if zeros in actual)
    pub mape: Option<f64>,
    /// R-squared (coefficient of determination)
    pub r_squared: f64,
    /// R-squared adjusted for residual degrees of freedom; NaN when none remain.
    pub r_squared_adj: f64,
}

impl FitStatistics {
    /// Statistic names, in the order of [`to_vec`](Self::to_vec).
    pub const NAMES: [&'static str; 11] = [
        "n",
        "df_model",
        "df_residual",
        "sse",
        "mse",
        "rmse",
        "mae",
        "smape",
        "mape",
        "r_squared",
        "r_squared_adj",
    ];

    /// Values in [`NAMES`](Self::NAMES) order. An undefined MAPE becomes NaN.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.n as f64,
            self.df_model as f64,
            self.df_residual as f64,
            self.sse,
            self.mse,
            self.rmse,
            self.mae,
            self.smape,
            self.mape.unwrap_or(f64::NAN),
            self.r_squared,
            self.r_squared_adj,
        ]
    }

    /// Look up a statistic by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        Self::NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.to_vec()[i])
    }
}

/// Compute fit statistics for equally long `actual` and `forecast` vectors.
///
/// Vectors must already be aligned and free of unknowable entries; a length
/// difference is reported, never truncated.
pub fn diagnose(actual: &[f64], forecast: &[f64], dof: DegreesOfFreedom) -> Result<FitStatistics> {
    if actual.is_empty() || forecast.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if actual.len() != forecast.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: forecast.len(),
        });
    }
    if let Some(i) = actual
        .iter()
        .zip(forecast.iter())
        .position(|(a, f)| !a.is_finite() || !f.is_finite())
    {
        return Err(ForecastError::ComputationError(format!(
            "non-finite value at aligned position {i}"
        )));
    }

    let n = actual.len();
    let nf = n as f64;

    let sse: f64 = actual
        .iter()
        .zip(forecast.iter())
        .map(|(a, f)| (a - f).powi(2))
        .sum();
    let mse = sse / nf;
    let rmse = mse.sqrt();

    let mae = actual
        .iter()
        .zip(forecast.iter())
        .map(|(a, f)| (a - f).abs())
        .sum::<f64>()
        / nf;

    let smape = actual
        .iter()
        .zip(forecast.iter())
        .map(|(a, f)| {
            let denom = a.abs() + f.abs();
            if denom == 0.0 {
                0.0
            } else {
                2.0 * (a - f).abs() / denom
            }
        })
        .sum::<f64>()
        * 100.0
        / nf;

    let mape = if actual.contains(&0.0) {
        None
    } else {
        let sum: f64 = actual
            .iter()
            .zip(forecast.iter())
            .map(|(a, f)| ((a - f) / a).abs())
            .sum();
        Some(100.0 * sum / nf)
    };

    let mean = actual.iter().sum::<f64>() / nf;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    // A constant target is explained only by an exact fit.
    let r_squared = match (ss_tot == 0.0, sse == 0.0) {
        (true, true) => 1.0,
        (true, false) => 0.0,
        _ => 1.0 - sse / ss_tot,
    };

    let r_squared_adj = if dof.residual == 0 {
        f64::NAN
    } else {
        1.0 - (1.0 - r_squared) * (nf - 1.0) / dof.residual as f64
    };

    Ok(FitStatistics {
        n,
        df_model: dof.model,
        df_residual: dof.residual,
        sse,
        mse,
        rmse,
        mae,
        smape,
        mape,
        r_squared,
        r_squared_adj,
    })
}
