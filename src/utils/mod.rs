//! Numeric helpers shared by the models.

pub mod lags;
pub mod ols;

pub use lags::{lag_design, LagDesign};
pub use ols::{ols_fit, OLSResult};
