//! # anofox-horizon
//!
//! Multi-horizon time series forecasting on a shared forecast matrix.
//!
//! Two engines fill a `(m + H) x (H + 2)` [`ForecastMatrix`](core::ForecastMatrix):
//! - [`RecursiveForecaster`](engine::RecursiveForecaster) sweeps horizon
//!   columns in ascending order, feeding lower-horizon forecasts back in as
//!   lag inputs.
//! - [`DirectForecaster`](engine::DirectForecaster) asks a multi-output model
//!   for all horizons of each origin at once.
//!
//! Both implement [`Forecastable`](models::Forecastable), which the rolling
//! validator in [`validation`] drives for walk-forward evaluation.
//!
//! # Example
//!
//! ```
//! use anofox_horizon::prelude::*;
//!
//! let series = Series::new(vec![1.0, 3.0, 4.0, 2.0, 5.0, 7.0, 9.0, 8.0, 6.0, 3.0]).unwrap();
//! let mut model = RecursiveForecaster::new(RandomWalk::new(), EngineConfig::new(2)).unwrap();
//! model.train(series.values()).unwrap();
//!
//! let matrix = model.forecast_all(&series).unwrap();
//! assert_eq!(matrix.get(4, 1).unwrap(), Some(2.0));
//! assert_eq!(matrix.get(4, 2).unwrap(), Some(4.0));
//! assert_eq!(matrix.get(1, 2).unwrap(), None);
//! ```

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod engine;
pub mod error;
pub mod models;
pub mod utils;
pub mod validation;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{Aligned, ForecastMatrix, RowConvention, Series};
    pub use crate::engine::{BackfillPolicy, DirectForecaster, EngineConfig, RecursiveForecaster};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::{
        AutoRegressive, DirectAutoRegressive, Forecastable, ModelRegistry, ModelSpec,
        MultiHorizonModel, OneStepModel, RandomWalk,
    };
    pub use crate::validation::{diagnose, rolling_validate, FitStatistics, RollingConfig};
}
