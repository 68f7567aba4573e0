//! Command-line interface for training and scoring.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use crate::config::{ArtifactLayout, PipelineConfig};
use crate::pipeline::{PredictPipeline, StudentRecord, TrainPipeline};

#[derive(Parser)]
#[command(name = "scorecast", version, about = "Student performance regression pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest a CSV, select the best regressor, and persist artifacts
    Train {
        /// Source CSV with the student performance schema
        #[arg(short, long, default_value = "data/stud.csv")]
        data: PathBuf,
        /// Directory for split data and fitted artifacts
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,
        /// Minimum test R² a model must reach to be accepted
        #[arg(long, default_value_t = 0.6)]
        score_floor: f64,
    },
    /// Score a single student record against saved artifacts
    Predict {
        #[arg(long, default_value = "artifacts")]
        artifacts: PathBuf,
        #[arg(long)]
        gender: String,
        #[arg(long)]
        race_ethnicity: String,
        #[arg(long)]
        parental_level_of_education: String,
        #[arg(long)]
        lunch: String,
        #[arg(long)]
        test_preparation_course: String,
        #[arg(long)]
        reading_score: i64,
        #[arg(long)]
        writing_score: i64,
    },
}

pub fn cmd_train(data: &PathBuf, artifacts: &PathBuf, score_floor: f64) -> anyhow::Result<()> {
    let started = Instant::now();

    let mut config = PipelineConfig::default();
    config.ingestion.source_path = data.clone();
    config.selection.score_floor = score_floor;
    config.layout = ArtifactLayout::new(artifacts);

    let report = TrainPipeline::new(config).run()?;

    println!("Model scores (held-out R²):");
    for score in &report.scores {
        println!(
            "  {:<20} test {:>7.4}  train {:>7.4}",
            score.name, score.test_r2, score.train_r2
        );
    }
    println!(
        "Selected {} with R² {:.4} in {:.2?}",
        report.best_name,
        report.best_score,
        started.elapsed()
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_predict(
    artifacts: &PathBuf,
    gender: String,
    race_ethnicity: String,
    parental_level_of_education: String,
    lunch: String,
    test_preparation_course: String,
    reading_score: i64,
    writing_score: i64,
) -> anyhow::Result<()> {
    let layout = ArtifactLayout::new(artifacts);
    let pipeline = PredictPipeline::load(&layout)?;

    let record = StudentRecord {
        gender,
        race_ethnicity,
        parental_level_of_education,
        lunch,
        test_preparation_course,
        reading_score,
        writing_score,
    };

    let prediction = pipeline.predict(&record)?;
    println!(
        "Predicted math score: {:.2} ({})",
        prediction,
        pipeline.model_name()
    );
    Ok(())
}
