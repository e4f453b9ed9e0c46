//! Error types for the car price predictor

use thiserror::Error;

/// Result type alias for predictor operations
pub type Result<T> = std::result::Result<T, PredictorError>;

/// Main error type for the predictor
#[derive(Error, Debug)]
pub enum PredictorError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not trained: train the model first")]
    ModelNotFitted,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },
}

impl PredictorError {
    /// Whether the error comes from malformed or insufficient training data.
    ///
    /// The request layer maps these to a client-side failure rather than an
    /// internal one.
    pub fn is_data_validation(&self) -> bool {
        matches!(
            self,
            PredictorError::DataError(_)
                | PredictorError::ValidationError(_)
                | PredictorError::FeatureNotFound(_)
        )
    }

    /// Whether the error means no model is available yet
    pub fn is_not_trained(&self) -> bool {
        matches!(self, PredictorError::ModelNotFitted)
    }
}

impl From<polars::error::PolarsError> for PredictorError {
    fn from(err: polars::error::PolarsError) -> Self {
        PredictorError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for PredictorError {
    fn from(err: serde_json::Error) -> Self {
        PredictorError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PredictorError {
    fn from(err: ndarray::ShapeError) -> Self {
        PredictorError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
