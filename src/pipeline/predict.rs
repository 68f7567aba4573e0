//! Inference pipeline: score a single student record against the persisted
//! preprocessor and model.

use crate::artifact;
use crate::config::ArtifactLayout;
use crate::error::{Result, ScorecastError};
use crate::model::RegressorKind;
use crate::preprocessing::Preprocessor;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One student's features, matching the training schema minus the target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRecord {
    pub gender: String,
    pub race_ethnicity: String,
    pub parental_level_of_education: String,
    pub lunch: String,
    pub test_preparation_course: String,
    pub reading_score: i64,
    pub writing_score: i64,
}

impl StudentRecord {
    /// Build a one-row frame with the training column layout.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let df = df!(
            "gender" => [self.gender.as_str()],
            "race_ethnicity" => [self.race_ethnicity.as_str()],
            "parental_level_of_education" => [self.parental_level_of_education.as_str()],
            "lunch" => [self.lunch.as_str()],
            "test_preparation_course" => [self.test_preparation_course.as_str()],
            "reading_score" => [self.reading_score],
            "writing_score" => [self.writing_score],
        )?;
        Ok(df)
    }
}

/// Loads the persisted artifacts once and scores records against them.
#[derive(Debug)]
pub struct PredictPipeline {
    preprocessor: Preprocessor,
    model: RegressorKind,
}

impl PredictPipeline {
    /// Load both artifacts from the layout. Fails with a missing-artifact
    /// error when training has not been run.
    pub fn load(layout: &ArtifactLayout) -> Result<Self> {
        let preprocessor: Preprocessor = artifact::load(&layout.preprocessor())?;
        let model: RegressorKind = artifact::load(&layout.model())?;
        debug!(model = model.name(), "loaded inference artifacts");
        Ok(Self {
            preprocessor,
            model,
        })
    }

    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    /// Predict the target score for a single record.
    pub fn predict(&self, record: &StudentRecord) -> Result<f64> {
        let df = record.to_dataframe()?;
        let features = self.preprocessor.transform(&df)?;
        let predictions = self.model.predict(&features)?;
        predictions
            .first()
            .copied()
            .ok_or_else(|| ScorecastError::DataError("empty prediction output".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_to_dataframe_shape() {
        let record = StudentRecord {
            gender: "female".to_string(),
            race_ethnicity: "group B".to_string(),
            parental_level_of_education: "bachelor's degree".to_string(),
            lunch: "standard".to_string(),
            test_preparation_course: "none".to_string(),
            reading_score: 72,
            writing_score: 74,
        };
        let df = record.to_dataframe().unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), 7);
        assert!(df.column("reading_score").is_ok());
    }
}
