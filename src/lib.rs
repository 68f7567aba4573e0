//! Scorecast: a student performance regression pipeline.
//!
//! Ingests the student performance CSV, splits it with a seeded shuffle,
//! preprocesses numeric and categorical features, runs a roster of
//! regressors through cross-validated grid search, and persists the
//! winning model plus its preprocessor as JSON artifacts. A separate
//! inference pipeline scores individual records against those artifacts.

pub mod artifact;
pub mod cli;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod preprocessing;

pub use error::{Result, ScorecastError};

pub mod prelude {
    pub use crate::config::{ArtifactLayout, PipelineConfig};
    pub use crate::error::{Result, ScorecastError};
    pub use crate::model::{default_candidates, Candidate, RegressorKind};
    pub use crate::pipeline::{PredictPipeline, StudentRecord, TrainPipeline, TrainReport};
    pub use crate::preprocessing::Preprocessor;
}
