//! Out-of-sample evaluation of forecasters.
//!
//! Provides walk-forward (rolling) validation and the fit statistics it
//! reports.
//!
//! # Example
//!
//! ```
//! use anofox_horizon::core::Series;
//! use anofox_horizon::engine::{EngineConfig, RecursiveForecaster};
//! use anofox_horizon::models::RandomWalk;
//! use anofox_horizon::validation::{rolling_validate, RollingConfig};
//!
//! let series = Series::new((0..40).map(|i| (i as f64 * 0.3).sin() + 5.0).collect()).unwrap();
//! let mut model = RecursiveForecaster::new(RandomWalk::new(), EngineConfig::new(2)).unwrap();
//!
//! let config = RollingConfig::new()
//!     .with_test_fraction(0.25)
//!     .with_retrain_cycle(2)
//!     .with_growing_window(true);
//! let report = rolling_validate(&mut model, &series, &config).unwrap();
//!
//! assert_eq!(report.test_size, 10);
//! assert_eq!(report.one_step.len(), 9);
//! assert_eq!(report.retrains, 5);
//! ```

pub mod diagnostics;
pub mod rolling;

pub use diagnostics::{diagnose, FitStatistics};
pub use rolling::{
    rolling_validate, rolling_validate_all, RollingConfig, RollingReport, RollingState,
    RollingStep, RollingValidator,
};
