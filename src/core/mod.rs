//! Core data structures: the observed series and the forecast matrix.

mod forecast_matrix;
mod series;

pub use forecast_matrix::{Access, Aligned, ForecastMatrix, MatrixRow, RowConvention};
pub use series::Series;
