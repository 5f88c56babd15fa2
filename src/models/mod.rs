//! Model contracts and reference models.

mod autoregressive;
mod direct_ar;
mod random_walk;
mod traits;

pub use autoregressive::AutoRegressive;
pub use direct_ar::DirectAutoRegressive;
pub use random_walk::RandomWalk;
pub use traits::{
    BoxedForecastable, DegreesOfFreedom, Forecastable, ModelRegistry, ModelSpec,
    MultiHorizonModel, OneStepModel,
};
