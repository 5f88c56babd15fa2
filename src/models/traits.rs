//! Model contracts.
//!
//! Concrete models implement one of two narrow traits:
//! - [`OneStepModel`]: maps a lag window to the next value. Driven by
//!   [`RecursiveForecaster`](crate::engine::RecursiveForecaster).
//! - [`MultiHorizonModel`]: emits every horizon from one origin in a single
//!   call. Driven by [`DirectForecaster`](crate::engine::DirectForecaster).
//!
//! Both engines expose the uniform [`Forecastable`] contract consumed by the
//! rolling validator.

use crate::core::{ForecastMatrix, Series};
use crate::error::Result;

/// Degrees of freedom of a fitted model over `n` observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegreesOfFreedom {
    /// Parameters estimated by the model.
    pub model: usize,
    /// Observations left after estimation.
    pub residual: usize,
}

impl DegreesOfFreedom {
    pub fn new(parameters: usize, observations: usize) -> Self {
        Self {
            model: parameters,
            residual: observations.saturating_sub(parameters),
        }
    }
}

/// Single-output model whose native primitive is a one-step forecast.
pub trait OneStepModel {
    /// Fit parameters on a contiguous window. Must support repeated calls.
    fn train(&mut self, window: &[f64]) -> Result<()>;

    /// Forecast the value at `target` from `lags`, where `lags[k]` is the
    /// value at time `target - 1 - k`.
    fn predict_lags(&self, target: usize, lags: &[f64]) -> Result<f64>;

    /// Number of lagged values the model reads.
    fn lag_depth(&self) -> usize;

    /// Shortest window `train` accepts.
    fn min_train_len(&self) -> usize {
        self.lag_depth() + 1
    }

    /// Number of estimated parameters.
    fn parameter_count(&self) -> usize;

    fn is_trained(&self) -> bool;

    fn name(&self) -> &str;
}

/// Model with one independently trained mapping per horizon.
pub trait MultiHorizonModel {
    /// Fit one mapping per horizon `1..=horizon` on a contiguous window.
    fn train(&mut self, window: &[f64], horizon: usize) -> Result<()>;

    /// Forecasts for horizons `1..=H` issued from `origin`, using only
    /// `series[..=origin]`.
    fn predict_horizons(&self, origin: usize, series: &[f64]) -> Result<Vec<f64>>;

    /// Shortest window `train` accepts for `horizon` heads.
    fn min_train_len(&self, horizon: usize) -> usize;

    fn parameter_count(&self) -> usize;

    fn is_trained(&self) -> bool;

    fn name(&self) -> &str;
}

/// Common interface of every forecaster the engine drives.
///
/// This trait is object-safe and can be used with `Box<dyn Forecastable>`.
pub trait Forecastable {
    /// Fit the model to a training window.
    ///
    /// A window shorter than [`min_train_len`](Self::min_train_len) yields
    /// `ForecastError::InsufficientData`.
    fn train(&mut self, window: &[f64]) -> Result<()>;

    /// One-step forecast for `origin + 1` using data up to `origin`.
    fn predict(&self, origin: usize, series: &Series) -> Result<f64>;

    /// Forecasts for horizons `1..=H` issued from `origin`.
    fn forecast(&self, origin: usize, series: &Series) -> Result<Vec<f64>>;

    /// Fill horizon column `h` of the forecast matrix and return it indexed
    /// by target time (`m + H` entries).
    fn forecast_at(&mut self, h: usize, series: &Series) -> Result<Vec<Option<f64>>>;

    /// Fill every horizon column for `series`.
    fn forecast_all(&mut self, series: &Series) -> Result<&ForecastMatrix>;

    /// Matrix of the most recent pass, if any.
    fn matrix(&self) -> Option<&ForecastMatrix>;

    /// Maximum horizon `H`.
    fn horizon(&self) -> usize;

    fn min_train_len(&self) -> usize;

    fn parameter_count(&self) -> usize;

    fn degrees_of_freedom(&self, observations: usize) -> DegreesOfFreedom {
        DegreesOfFreedom::new(self.parameter_count(), observations)
    }

    fn name(&self) -> &str;
}

/// Type alias for boxed forecaster trait objects.
pub type BoxedForecastable = Box<dyn Forecastable>;

/// Model specification for batch evaluation.
///
/// # Example
///
/// ```
/// use anofox_horizon::engine::{EngineConfig, RecursiveForecaster};
/// use anofox_horizon::models::{ModelSpec, RandomWalk};
///
/// let spec = ModelSpec::with_horizon(
///     "RandomWalk",
///     |h| Box::new(RecursiveForecaster::new(RandomWalk::new(), EngineConfig::new(h)).unwrap()),
///     3,
/// );
/// let model = spec.create();
/// assert_eq!(model.horizon(), 3);
/// ```
pub struct ModelSpec {
    /// Display name of the model
    pub name: &'static str,
    factory: Box<dyn Fn() -> BoxedForecastable + Send + Sync>,
}

impl ModelSpec {
    /// Create a model spec with a simple factory.
    pub fn new<F>(name: &'static str, factory: F) -> Self
    where
        F: Fn() -> BoxedForecastable + Send + Sync + 'static,
    {
        Self {
            name,
            factory: Box::new(factory),
        }
    }

    /// Create a model spec with a horizon parameter.
    pub fn with_horizon<F>(name: &'static str, factory: F, horizon: usize) -> Self
    where
        F: Fn(usize) -> BoxedForecastable + Send + Sync + 'static,
    {
        Self {
            name,
            factory: Box::new(move || factory(horizon)),
        }
    }

    /// Create a new, untrained model instance.
    pub fn create(&self) -> BoxedForecastable {
        (self.factory)()
    }
}

/// Collection of model specifications.
pub struct ModelRegistry {
    models: Vec<ModelSpec>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self { models: Vec::new() }
    }

    pub fn register(&mut self, spec: ModelSpec) {
        self.models.push(spec);
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.iter()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
