//! Error types for the scorecast pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, ScorecastError>;

/// Main error type for the pipeline.
///
/// Every stage fails fast: errors are wrapped with context and propagated
/// to the caller, never recovered or retried locally.
#[derive(Error, Debug)]
pub enum ScorecastError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("No acceptable model: best test score {best_score:.4} is below the floor {floor:.2}")]
    NoAcceptableModel { best_score: f64, floor: f64 },

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Model not fitted")]
    NotFitted,

    #[error("Artifact not found at {0}; run training first")]
    ArtifactMissing(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for ScorecastError {
    fn from(err: polars::error::PolarsError) -> Self {
        ScorecastError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for ScorecastError {
    fn from(err: serde_json::Error) -> Self {
        ScorecastError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for ScorecastError {
    fn from(err: ndarray::ShapeError) -> Self {
        ScorecastError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
