//! Multi-horizon forecast matrix.
//!
//! A `(m + H) x (H + 2)` table: column 0 holds the actual value of row `t`,
//! columns `1..=H` hold forecasts and the last column is the time index.
//! Unknowable or unfilled cells are `None`.
//!
//! Rows follow one of two conventions fixed at allocation:
//! - [`RowConvention::Target`]: cell `(t, h)` is the `h`-step forecast that
//!   targets time `t`, issued from origin `t - h`. Filled one horizon column at
//!   a time, in ascending order.
//! - [`RowConvention::Origin`]: cell `(t, h)` is the `h`-step forecast issued
//!   from origin `t`, targeting `t + h`. Filled one row at a time.

use crate::core::Series;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};

/// Row indexing convention of a [`ForecastMatrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowConvention {
    /// Row `t` holds forecasts whose target is `t`.
    Target,
    /// Row `t` holds forecasts whose origin is `t`.
    Origin,
}

/// One recorded access to forecast cells, in pass order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// A forecast cell read while forging an input window.
    Read { t: usize, h: usize },
    /// A whole horizon column written.
    WriteColumn { h: usize },
    /// A whole origin row written.
    WriteRow { origin: usize },
}

/// Actual/forecast pairs for one horizon with sentinel rows removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aligned {
    /// Target time of each pair.
    pub targets: Vec<usize>,
    pub actual: Vec<f64>,
    pub forecast: Vec<f64>,
}

impl Aligned {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, target: usize, actual: f64, forecast: f64) {
        self.targets.push(target);
        self.actual.push(actual);
        self.forecast.push(forecast);
    }

    pub fn len(&self) -> usize {
        self.actual.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actual.is_empty()
    }
}

/// Exported view of one matrix row.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRow {
    /// Logical time index.
    pub t: usize,
    pub timestamp: Option<DateTime<Utc>>,
    pub actual: Option<f64>,
    /// Forecasts for horizons `1..=H`.
    pub forecasts: Vec<Option<f64>>,
}

/// Forecast matrix owned by a single forecaster.
#[derive(Debug, Clone)]
pub struct ForecastMatrix {
    convention: RowConvention,
    observed: usize,
    horizon: usize,
    actual: Vec<Option<f64>>,
    /// Row-major forecast cells, `(t, h)` at `t * horizon + h - 1`.
    cells: Vec<Option<f64>>,
    /// Observed timestamps followed by extrapolated ones, `None` where the
    /// spacing cannot be inferred.
    timestamps: Option<Vec<Option<DateTime<Utc>>>>,
    /// Next horizon column a target-convention pass may write.
    next_horizon: usize,
    /// Highest horizon read while forging in the current pass.
    max_read: Cell<usize>,
    /// Set once an origin-convention pass has written all its rows.
    rows_done: bool,
    audit: Option<RefCell<Vec<Access>>>,
}

impl ForecastMatrix {
    /// Allocate a matrix for `series` and seed the actual and time columns.
    ///
    /// Forecast columns start unfilled.
    pub fn allocate(series: &Series, horizon: usize, convention: RowConvention) -> Result<Self> {
        if series.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon must be at least 1".to_string(),
            ));
        }

        let m = series.len();
        let rows = m + horizon;
        let mut actual: Vec<Option<f64>> = series.values().iter().copied().map(Some).collect();
        actual.resize(rows, None);

        let timestamps = series
            .timestamps()
            .map(|_| (0..rows).map(|t| series.timestamp_at(t)).collect::<Vec<_>>());

        Ok(Self {
            convention,
            observed: m,
            horizon,
            actual,
            cells: vec![None; rows * horizon],
            timestamps,
            next_horizon: 1,
            max_read: Cell::new(0),
            rows_done: false,
            audit: None,
        })
    }

    /// Record every forecast-cell read and write from now on.
    pub fn with_access_audit(mut self) -> Self {
        self.audit = Some(RefCell::new(Vec::new()));
        self
    }

    /// Accesses recorded since allocation.
    pub fn access_log(&self) -> Option<Vec<Access>> {
        self.audit.as_ref().map(|log| log.borrow().clone())
    }

    pub fn convention(&self) -> RowConvention {
        self.convention
    }

    /// Number of observed time points `m`.
    pub fn observed(&self) -> usize {
        self.observed
    }

    /// Maximum horizon `H`.
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Number of rows, `m + H`.
    pub fn rows(&self) -> usize {
        self.actual.len()
    }

    /// Number of logical columns, `H + 2`.
    pub fn columns(&self) -> usize {
        self.horizon + 2
    }

    /// Actual value of row `t`; `None` past the observed series.
    pub fn actual(&self, t: usize) -> Option<f64> {
        self.actual.get(t).copied().flatten()
    }

    /// Time index column.
    pub fn time_index(&self, t: usize) -> Result<usize> {
        self.check_row(t)?;
        Ok(t)
    }

    /// Timestamp of row `t` when the source series carried timestamps.
    pub fn timestamp(&self, t: usize) -> Option<DateTime<Utc>> {
        self.timestamps
            .as_ref()
            .and_then(|ts| ts.get(t).copied().flatten())
    }

    /// Whether the actual column was seeded from exactly these values.
    pub fn is_built_from(&self, series: &Series) -> bool {
        series.len() == self.observed
            && series
                .values()
                .iter()
                .zip(&self.actual)
                .all(|(v, a)| *a == Some(*v))
    }

    /// Whether cell `(t, h)` can ever hold a forecast.
    pub fn is_knowable(&self, t: usize, h: usize) -> bool {
        if h == 0 || h > self.horizon || t >= self.rows() {
            return false;
        }
        match self.convention {
            RowConvention::Target => t >= h && t - h < self.observed,
            RowConvention::Origin => t < self.observed,
        }
    }

    /// Forecast cell `(t, h)`.
    pub fn get(&self, t: usize, h: usize) -> Result<Option<f64>> {
        self.check_horizon(h)?;
        self.check_row(t)?;
        Ok(self.cells[self.index(t, h)])
    }

    /// Whole horizon column in this matrix's row convention.
    pub fn column(&self, h: usize) -> Result<Vec<Option<f64>>> {
        self.check_horizon(h)?;
        Ok((0..self.rows()).map(|t| self.cells[self.index(t, h)]).collect())
    }

    /// Horizon column re-indexed by target time, whatever the convention.
    pub fn target_column(&self, h: usize) -> Result<Vec<Option<f64>>> {
        self.check_horizon(h)?;
        match self.convention {
            RowConvention::Target => self.column(h),
            RowConvention::Origin => {
                let rows = self.rows();
                let mut out = vec![None; rows];
                for origin in 0..rows.saturating_sub(h) {
                    out[origin + h] = self.cells[self.index(origin, h)];
                }
                Ok(out)
            }
        }
    }

    /// Forecasts issued from `origin` for horizons `1..=H`.
    pub fn origin_row(&self, origin: usize) -> Result<Vec<Option<f64>>> {
        self.check_row(origin)?;
        let rows = self.rows();
        Ok((1..=self.horizon)
            .map(|h| match self.convention {
                RowConvention::Origin => self.cells[self.index(origin, h)],
                RowConvention::Target if origin + h < rows => {
                    self.cells[self.index(origin + h, h)]
                }
                RowConvention::Target => None,
            })
            .collect())
    }

    /// Pair actuals with horizon-`h` forecasts, dropping sentinel rows.
    pub fn aligned(&self, h: usize) -> Result<Aligned> {
        self.check_horizon(h)?;
        let column = self.target_column(h)?;
        let mut aligned = Aligned::new();
        for (t, forecast) in column.into_iter().enumerate() {
            if let (Some(actual), Some(forecast)) = (self.actual(t), forecast) {
                aligned.push(t, actual, forecast);
            }
        }
        Ok(aligned)
    }

    /// Export every row with its timestamp and forecasts.
    pub fn to_rows(&self) -> Vec<MatrixRow> {
        (0..self.rows())
            .map(|t| MatrixRow {
                t,
                timestamp: self.timestamp(t),
                actual: self.actual(t),
                forecasts: (1..=self.horizon)
                    .map(|h| self.cells[self.index(t, h)])
                    .collect(),
            })
            .collect()
    }

    /// Whether every horizon column of the current pass has been written.
    pub fn is_complete(&self) -> bool {
        match self.convention {
            RowConvention::Target => self.next_horizon > self.horizon,
            RowConvention::Origin => self.rows_done,
        }
    }

    /// Next horizon a target-convention pass expects.
    pub fn next_horizon(&self) -> usize {
        self.next_horizon
    }

    /// Read a finished lower-horizon cell while forging an input window.
    pub(crate) fn read_forecast(&self, t: usize, h: usize) -> Result<f64> {
        self.check_horizon(h)?;
        self.check_row(t)?;
        if self.convention == RowConvention::Target && h >= self.next_horizon {
            return Err(ForecastError::DiagonalPrecedence {
                horizon: self.next_horizon,
                read: h,
            });
        }
        if h > self.max_read.get() {
            self.max_read.set(h);
        }
        if let Some(log) = &self.audit {
            log.borrow_mut().push(Access::Read { t, h });
        }
        self.cells[self.index(t, h)].ok_or_else(|| {
            ForecastError::ComputationError(format!("forecast cell ({t}, {h}) is unfilled"))
        })
    }

    /// Write horizon column `h` of a target-convention pass.
    pub(crate) fn write_column(&mut self, h: usize, values: Vec<Option<f64>>) -> Result<()> {
        self.check_horizon(h)?;
        if self.convention != RowConvention::Target {
            return Err(ForecastError::InvalidParameter(
                "column writes require target row convention".to_string(),
            ));
        }
        if h != self.next_horizon {
            return Err(ForecastError::HorizonOrder {
                requested: h,
                next: self.next_horizon,
            });
        }
        if self.max_read.get() >= h {
            return Err(ForecastError::DiagonalPrecedence {
                horizon: h,
                read: self.max_read.get(),
            });
        }
        if values.len() != self.rows() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.rows(),
                got: values.len(),
            });
        }

        for (t, value) in values.into_iter().enumerate() {
            let idx = self.index(t, h);
            self.cells[idx] = if self.is_knowable(t, h) { value } else { None };
        }
        if let Some(log) = &self.audit {
            log.borrow_mut().push(Access::WriteColumn { h });
        }
        self.next_horizon += 1;
        Ok(())
    }

    /// Write the forecasts issued from `origin` in an origin-convention pass.
    pub(crate) fn write_row(&mut self, origin: usize, values: &[f64]) -> Result<()> {
        if self.convention != RowConvention::Origin {
            return Err(ForecastError::InvalidParameter(
                "row writes require origin row convention".to_string(),
            ));
        }
        if origin >= self.observed {
            return Err(ForecastError::IndexOutOfBounds {
                index: origin,
                size: self.observed,
            });
        }
        if values.len() != self.horizon {
            return Err(ForecastError::DimensionMismatch {
                expected: self.horizon,
                got: values.len(),
            });
        }

        for (k, &value) in values.iter().enumerate() {
            let idx = self.index(origin, k + 1);
            self.cells[idx] = Some(value);
        }
        if let Some(log) = &self.audit {
            log.borrow_mut().push(Access::WriteRow { origin });
        }
        Ok(())
    }

    /// Mark an origin-convention pass as finished.
    pub(crate) fn finish_rows(&mut self) {
        self.rows_done = true;
    }

    fn index(&self, t: usize, h: usize) -> usize {
        t * self.horizon + h - 1
    }

    fn check_horizon(&self, h: usize) -> Result<()> {
        if h == 0 || h > self.horizon {
            return Err(ForecastError::InvalidHorizon {
                horizon: h,
                max: self.horizon,
            });
        }
        Ok(())
    }

    fn check_row(&self, t: usize) -> Result<()> {
        if t >= self.rows() {
            return Err(ForecastError::IndexOutOfBounds {
                index: t,
                size: self.rows(),
            });
        }
        Ok(())
    }
}
