//! Forecast engines.
//!
//! [`RecursiveForecaster`] fills the matrix diagonal by diagonal from a
//! one-step model; [`DirectForecaster`] fills it row by row from a model that
//! emits every horizon at once.

mod config;
mod direct;
mod forge;
mod recursive;

pub use config::EngineConfig;
pub use direct::DirectForecaster;
pub use forge::{actual_lags, forge, BackfillPolicy};
pub use recursive::RecursiveForecaster;
