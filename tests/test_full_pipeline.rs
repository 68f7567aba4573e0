//! Integration tests: training end to end, artifact layout, and inference.

use scorecast::artifact;
use scorecast::config::{ArtifactLayout, PipelineConfig, SchemaConfig};
use scorecast::ingestion::read_csv;
use scorecast::model::grid::ParamGrid;
use scorecast::model::{Candidate, LinearRegression, RandomForestRegressor, RegressorKind};
use scorecast::pipeline::{PredictPipeline, StudentRecord, TrainPipeline};
use scorecast::preprocessing::Preprocessor;
use scorecast::ScorecastError;
use std::fmt::Write as _;
use std::path::Path;
use tempfile::TempDir;

const GENDERS: [&str; 2] = ["female", "male"];
const GROUPS: [&str; 3] = ["group A", "group B", "group C"];
const EDUCATION: [&str; 3] = ["some college", "bachelor's degree", "master's degree"];
const LUNCH: [&str; 2] = ["standard", "free/reduced"];
const PREP: [&str; 2] = ["none", "completed"];

/// Write a CSV where math_score is an exact average of the other two
/// scores, so a linear model recovers it almost perfectly.
fn write_learnable_csv(path: &Path, rows: usize) {
    let mut csv = String::from(
        "gender,race_ethnicity,parental_level_of_education,lunch,test_preparation_course,math_score,reading_score,writing_score\n",
    );
    for i in 0..rows {
        let reading = 40 + (i * 7) % 60;
        let writing = 42 + (i * 11) % 56;
        let math = (reading + writing) / 2;
        writeln!(
            csv,
            "{},{},{},{},{},{},{},{}",
            GENDERS[i % 2],
            GROUPS[i % 3],
            EDUCATION[(i / 2) % 3],
            LUNCH[(i / 3) % 2],
            PREP[(i / 5) % 2],
            math,
            reading,
            writing,
        )
        .unwrap();
    }
    std::fs::write(path, csv).unwrap();
}

/// Write a CSV whose target has no relation to the features.
fn write_noise_csv(path: &Path, rows: usize) {
    let mut csv = String::from(
        "gender,race_ethnicity,parental_level_of_education,lunch,test_preparation_course,math_score,reading_score,writing_score\n",
    );
    for i in 0..rows {
        // Deterministic scramble with no linear structure.
        let math = (i * 7919) % 100;
        writeln!(
            csv,
            "{},{},{},{},{},{},{},{}",
            GENDERS[i % 2],
            GROUPS[i % 3],
            EDUCATION[(i / 2) % 3],
            LUNCH[(i / 3) % 2],
            PREP[(i / 5) % 2],
            math,
            50,
            50,
        )
        .unwrap();
    }
    std::fs::write(path, csv).unwrap();
}

fn config_for(dir: &TempDir, source: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.ingestion.source_path = source.to_path_buf();
    config.layout = ArtifactLayout::new(dir.path().join("artifacts"));
    config
}

fn linear_only() -> Vec<Candidate> {
    vec![Candidate::new(
        RegressorKind::Linear(LinearRegression::new()),
        ParamGrid::new(),
    )]
}

#[test]
fn test_train_writes_all_artifacts() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("stud.csv");
    write_learnable_csv(&source, 60);

    let config = config_for(&dir, &source);
    let layout = config.layout.clone();

    let report = TrainPipeline::new(config)
        .with_candidates(linear_only())
        .run()
        .unwrap();

    assert_eq!(report.best_name, "linear_regression");
    assert!(report.best_score > 0.95, "score was {}", report.best_score);

    assert!(layout.raw_data().exists());
    assert!(layout.train_data().exists());
    assert!(layout.test_data().exists());
    assert!(layout.preprocessor().exists());
    assert!(layout.model().exists());
}

#[test]
fn test_split_partitions_every_row() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("stud.csv");
    write_learnable_csv(&source, 60);

    let config = config_for(&dir, &source);
    let layout = config.layout.clone();
    TrainPipeline::new(config)
        .with_candidates(linear_only())
        .run()
        .unwrap();

    let train = read_csv(&layout.train_data()).unwrap();
    let test = read_csv(&layout.test_data()).unwrap();
    assert_eq!(train.height() + test.height(), 60);
    assert_eq!(test.height(), 12);
}

#[test]
fn test_inference_round_trip() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("stud.csv");
    write_learnable_csv(&source, 60);

    let config = config_for(&dir, &source);
    let layout = config.layout.clone();
    TrainPipeline::new(config)
        .with_candidates(linear_only())
        .run()
        .unwrap();

    let pipeline = PredictPipeline::load(&layout).unwrap();
    let record = StudentRecord {
        gender: "female".to_string(),
        race_ethnicity: "group B".to_string(),
        parental_level_of_education: "bachelor's degree".to_string(),
        lunch: "standard".to_string(),
        test_preparation_course: "none".to_string(),
        reading_score: 70,
        writing_score: 80,
    };

    let prediction = pipeline.predict(&record).unwrap();
    assert!(prediction.is_finite());
    // Target is the score average, so the fit should land close to it.
    assert!((prediction - 75.0).abs() < 10.0, "prediction was {prediction}");
}

#[test]
fn test_saved_artifacts_reproduce_fitted_behavior() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("stud.csv");
    write_learnable_csv(&source, 60);
    let df = read_csv(&source).unwrap();

    let mut preprocessor = Preprocessor::new(SchemaConfig::default());
    let x = preprocessor.fit_transform(&df).unwrap();
    let y = preprocessor.target_vector(&df).unwrap();

    let mut model = RegressorKind::RandomForest(RandomForestRegressor::new(16));
    model.fit(&x, &y).unwrap();
    let predictions = model.predict(&x).unwrap();

    let prep_path = dir.path().join("preprocessor.json");
    let model_path = dir.path().join("model.json");
    artifact::save(&preprocessor, &prep_path).unwrap();
    artifact::save(&model, &model_path).unwrap();

    let loaded_prep: Preprocessor = artifact::load(&prep_path).unwrap();
    let loaded_model: RegressorKind = artifact::load(&model_path).unwrap();

    let x_loaded = loaded_prep.transform(&df).unwrap();
    assert_eq!(x.shape(), x_loaded.shape());
    for (a, b) in x.iter().zip(x_loaded.iter()) {
        assert_eq!(a, b);
    }

    let predictions_loaded = loaded_model.predict(&x_loaded).unwrap();
    assert_eq!(predictions.len(), predictions_loaded.len());
    for (a, b) in predictions.iter().zip(predictions_loaded.iter()) {
        assert_eq!(a, b);
    }
}

#[test]
fn test_score_floor_blocks_model_artifact() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("stud.csv");
    write_noise_csv(&source, 60);

    let config = config_for(&dir, &source);
    let layout = config.layout.clone();

    let err = TrainPipeline::new(config)
        .with_candidates(linear_only())
        .run()
        .unwrap_err();
    assert!(matches!(err, ScorecastError::NoAcceptableModel { .. }));

    // The preprocessor was fitted before selection, the model never landed.
    assert!(layout.preprocessor().exists());
    assert!(!layout.model().exists());
}

#[test]
fn test_predict_without_artifacts_errors() {
    let dir = TempDir::new().unwrap();
    let layout = ArtifactLayout::new(dir.path().join("artifacts"));
    let err = PredictPipeline::load(&layout).unwrap_err();
    assert!(matches!(err, ScorecastError::ArtifactMissing(_)));
}
