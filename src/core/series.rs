//! Series data structure: read-only ground truth for a forecasting run.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// An ordered sequence of observations indexed by integer time `t = 0..m`.
///
/// Timestamps are optional; when present they are only used to label matrix
/// rows; every engine works on the integer index.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    values: Vec<f64>,
    timestamps: Option<Vec<DateTime<Utc>>>,
    label: Option<String>,
}

impl Series {
    /// Create a series from values alone.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidParameter(format!(
                "non-finite observation at index {index}"
            )));
        }
        Ok(Self {
            values,
            timestamps: None,
            label: None,
        })
    }

    /// Create a series with one strictly increasing timestamp per value.
    pub fn with_timestamps(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: values.len(),
                got: timestamps.len(),
            });
        }
        for i in 1..timestamps.len() {
            if timestamps[i] <= timestamps[i - 1] {
                return Err(ForecastError::TimestampError(
                    "timestamps must be strictly increasing".to_string(),
                ));
            }
        }
        let mut series = Self::new(values)?;
        series.timestamps = Some(timestamps);
        Ok(series)
    }

    /// Attach a display label.
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Observation at `t`, if observed.
    pub fn get(&self, t: usize) -> Option<f64> {
        self.values.get(t).copied()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn timestamps(&self) -> Option<&[DateTime<Utc>]> {
        self.timestamps.as_deref()
    }

    /// Timestamp of row `t`, extrapolated past the end with the modal spacing.
    pub fn timestamp_at(&self, t: usize) -> Option<DateTime<Utc>> {
        let timestamps = self.timestamps.as_ref()?;
        if let Some(ts) = timestamps.get(t) {
            return Some(*ts);
        }
        let last = *timestamps.last()?;
        let step = self.infer_frequency().ok()?;
        let ahead = i32::try_from(t + 1 - timestamps.len()).ok()?;
        Some(last + step * ahead)
    }

    /// Modal spacing between consecutive timestamps.
    pub fn infer_frequency(&self) -> Result<Duration> {
        let timestamps = self
            .timestamps
            .as_ref()
            .ok_or_else(|| ForecastError::TimestampError("series has no timestamps".into()))?;
        if timestamps.len() < 2 {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: timestamps.len(),
            });
        }

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for w in timestamps.windows(2) {
            *counts.entry((w[1] - w[0]).num_seconds()).or_insert(0) += 1;
        }

        // Ties resolve to the smallest spacing so the result is deterministic.
        let modal = counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(&diff, _)| diff)
            .ok_or_else(|| ForecastError::TimestampError("empty spacing data".into()))?;

        Ok(Duration::seconds(modal))
    }

    /// Extract the sub-series `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Result<Series> {
        if start > end {
            return Err(ForecastError::InvalidParameter(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ForecastError::IndexOutOfBounds {
                index: end,
                size: self.len(),
            });
        }

        Ok(Series {
            values: self.values[start..end].to_vec(),
            timestamps: self.timestamps.as_ref().map(|ts| ts[start..end].to_vec()),
            label: self.label.clone(),
        })
    }
}

impl TryFrom<Vec<f64>> for Series {
    type Error = ForecastError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Series::new(values)
    }
}
