//! Error types for the anofox-horizon library.

use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while training, forecasting or validating.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Training window shorter than the history the model needs.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Horizon outside `1..=max`.
    #[error("invalid horizon {horizon}: must lie in 1..={max}")]
    InvalidHorizon { horizon: usize, max: usize },

    /// A horizon column was written after a read of the same or a later horizon.
    #[error("diagonal precedence violated: horizon {horizon} written after reading horizon {read}")]
    DiagonalPrecedence { horizon: usize, read: usize },

    /// A horizon column was requested before every lower horizon was filled.
    #[error("horizon {requested} requested before horizon {next} was filled")]
    HorizonOrder { requested: usize, next: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Model has not been trained yet.
    #[error("model must be trained before prediction")]
    FitRequired,

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),

    /// A rolling validation run was cancelled between steps.
    #[error("validation cancelled")]
    Cancelled,
}
