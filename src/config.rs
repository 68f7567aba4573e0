//! Pipeline configuration
//!
//! All stages take their configuration explicitly at construction so tests
//! can redirect paths and tighten or loosen the selection gate. Nothing in
//! the pipeline reads global state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fixed artifact layout under a single output directory.
///
/// The relative file names are part of the pipeline's external interface
/// and must stay stable across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactLayout {
    dir: PathBuf,
}

impl ArtifactLayout {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Verbatim copy of the source dataset.
    pub fn raw_data(&self) -> PathBuf {
        self.dir.join("data.csv")
    }

    pub fn train_data(&self) -> PathBuf {
        self.dir.join("train.csv")
    }

    pub fn test_data(&self) -> PathBuf {
        self.dir.join("test.csv")
    }

    /// Fitted preprocessor artifact.
    pub fn preprocessor(&self) -> PathBuf {
        self.dir.join("preprocessor.json")
    }

    /// Fitted best-model artifact.
    pub fn model(&self) -> PathBuf {
        self.dir.join("model.json")
    }
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self::new("artifacts")
    }
}

/// Configuration for dataset ingestion and the train/test split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Path of the source CSV.
    pub source_path: PathBuf,
    /// Fraction of rows held out as the test split.
    pub test_fraction: f64,
    /// Seed for the shuffled split.
    pub seed: u64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("data/stud.csv"),
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// The fixed feature schema of the student performance dataset.
///
/// The preprocessor is fit against exactly these columns; any table passed
/// to `fit` or `transform` must contain all of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub target_column: String,
}

impl SchemaConfig {
    /// All feature columns, numeric first, in declared order.
    pub fn feature_columns(&self) -> impl Iterator<Item = &String> {
        self.numeric_columns
            .iter()
            .chain(self.categorical_columns.iter())
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            numeric_columns: vec!["writing_score".to_string(), "reading_score".to_string()],
            categorical_columns: vec![
                "gender".to_string(),
                "race_ethnicity".to_string(),
                "parental_level_of_education".to_string(),
                "lunch".to_string(),
                "test_preparation_course".to_string(),
            ],
            target_column: "math_score".to_string(),
        }
    }
}

/// Configuration for model selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Number of cross-validation folds for the hyperparameter search.
    pub cv_folds: usize,
    /// Minimum acceptable test R²; selection fails below this.
    pub score_floor: f64,
    /// Seed for fold shuffling.
    pub seed: u64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            cv_folds: 3,
            score_floor: 0.6,
            seed: 42,
        }
    }
}

/// Top-level configuration for a training run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub ingestion: IngestionConfig,
    pub schema: SchemaConfig,
    pub selection: SelectionConfig,
    pub layout: ArtifactLayout,
}
