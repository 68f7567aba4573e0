//! Dataset ingestion
//!
//! Reads the source CSV, writes a raw copy plus the train/test splits under
//! the artifact directory, and hands the two frames to the rest of the
//! pipeline. The split is shuffled with a fixed seed so runs are
//! reproducible.

use crate::config::{ArtifactLayout, IngestionConfig};
use crate::error::{Result, ScorecastError};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Loads the dataset and produces the train/test splits.
pub struct DataIngestion {
    config: IngestionConfig,
    layout: ArtifactLayout,
}

impl DataIngestion {
    pub fn new(config: IngestionConfig, layout: ArtifactLayout) -> Self {
        Self { config, layout }
    }

    /// Run ingestion: read, copy, split, and persist both splits.
    pub fn run(&self) -> Result<(DataFrame, DataFrame)> {
        info!(source = %self.config.source_path.display(), "ingesting dataset");

        let df = read_csv(&self.config.source_path)?;
        info!(rows = df.height(), cols = df.width(), "dataset loaded");

        std::fs::create_dir_all(self.layout.dir())?;
        write_csv(&mut df.clone(), &self.layout.raw_data())?;

        let (mut train, mut test) = self.split(&df)?;
        write_csv(&mut train, &self.layout.train_data())?;
        write_csv(&mut test, &self.layout.test_data())?;

        info!(
            train_rows = train.height(),
            test_rows = test.height(),
            "train/test split written"
        );
        Ok((train, test))
    }

    /// Shuffled split into train and test frames.
    fn split(&self, df: &DataFrame) -> Result<(DataFrame, DataFrame)> {
        if !(0.0..1.0).contains(&self.config.test_fraction) {
            return Err(ScorecastError::DataError(format!(
                "test_fraction must be in [0, 1), got {}",
                self.config.test_fraction
            )));
        }

        let n = df.height();
        let test_size = (n as f64 * self.config.test_fraction).round() as usize;
        if n < 2 || test_size == 0 || test_size >= n {
            return Err(ScorecastError::DataError(format!(
                "cannot split {} rows with test_fraction {}",
                n, self.config.test_fraction
            )));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        indices.shuffle(&mut rng);

        let train_idx: IdxCa = IdxCa::from_vec(
            "idx".into(),
            indices[..n - test_size].iter().map(|&i| i as IdxSize).collect(),
        );
        let test_idx: IdxCa = IdxCa::from_vec(
            "idx".into(),
            indices[n - test_size..].iter().map(|&i| i as IdxSize).collect(),
        );

        let train = df.take(&train_idx)?;
        let test = df.take(&test_idx)?;
        Ok((train, test))
    }
}

/// Read a CSV file with header and schema inference.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(ScorecastError::ArtifactMissing(path.to_path_buf()));
    }
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Write a DataFrame as CSV with header.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}
