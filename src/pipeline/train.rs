//! Training pipeline: ingestion, preprocessing, model selection, and
//! artifact persistence in one pass.

use crate::artifact;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::ingestion::DataIngestion;
use crate::model::selection::{select_model, ModelScore};
use crate::model::{default_candidates, Candidate};
use crate::preprocessing::Preprocessor;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Summary of a completed training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainReport {
    pub best_name: String,
    pub best_score: f64,
    pub scores: Vec<ModelScore>,
}

/// Orchestrates the full training flow and writes every artifact under the
/// configured layout.
pub struct TrainPipeline {
    config: PipelineConfig,
    candidates: Option<Vec<Candidate>>,
}

impl TrainPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            candidates: None,
        }
    }

    /// Replace the default candidate roster.
    pub fn with_candidates(mut self, candidates: Vec<Candidate>) -> Self {
        self.candidates = Some(candidates);
        self
    }

    /// Run the whole pipeline. The preprocessor artifact is written as soon
    /// as it is fitted; the model artifact only lands once a candidate
    /// clears the score floor.
    pub fn run(self) -> Result<TrainReport> {
        let ingestion = DataIngestion::new(
            self.config.ingestion.clone(),
            self.config.layout.clone(),
        );
        let (train_df, test_df) = ingestion.run()?;

        let mut preprocessor = Preprocessor::new(self.config.schema.clone());
        let x_train = preprocessor.fit_transform(&train_df)?;
        let x_test = preprocessor.transform(&test_df)?;
        let y_train = preprocessor.target_vector(&train_df)?;
        let y_test = preprocessor.target_vector(&test_df)?;

        let preprocessor_path = self.config.layout.preprocessor();
        artifact::save(&preprocessor, &preprocessor_path)?;
        info!(path = %preprocessor_path.display(), "saved preprocessor");

        let candidates = self.candidates.unwrap_or_else(default_candidates);
        let selection = select_model(
            &x_train,
            &y_train,
            &x_test,
            &y_test,
            candidates,
            &self.config.selection,
        )?;

        let model_path = self.config.layout.model();
        artifact::save(&selection.model, &model_path)?;
        info!(
            path = %model_path.display(),
            model = %selection.best_name,
            score = selection.best_score,
            "saved model"
        );

        Ok(TrainReport {
            best_name: selection.best_name,
            best_score: selection.best_score,
            scores: selection.report,
        })
    }
}
