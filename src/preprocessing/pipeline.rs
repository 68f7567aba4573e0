//! The fitted preprocessor: table in, numeric matrix out

use super::{CategoricalImputer, NumericImputer, OneHotEncoder, StandardScaler};
use crate::config::SchemaConfig;
use crate::error::{Result, ScorecastError};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fixed feature transform for the student performance schema.
///
/// Numeric columns: median impute, then z-score scale. Categorical columns:
/// mode impute, one-hot encode with sorted fit-time categories, then scale
/// by standard deviation only. The schema seen at fit time is enforced on
/// every transform call; a table missing a declared column is a data error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preprocessor {
    schema: SchemaConfig,
    numeric_imputer: NumericImputer,
    categorical_imputer: CategoricalImputer,
    numeric_scaler: StandardScaler,
    encoder: OneHotEncoder,
    onehot_scaler: StandardScaler,
    feature_names: Vec<String>,
    is_fitted: bool,
}

impl Preprocessor {
    pub fn new(schema: SchemaConfig) -> Self {
        Self {
            schema,
            numeric_imputer: NumericImputer::new(),
            categorical_imputer: CategoricalImputer::new(),
            numeric_scaler: StandardScaler::new(true),
            encoder: OneHotEncoder::new(),
            onehot_scaler: StandardScaler::new(false),
            feature_names: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit every stage on the training table.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.check_schema(df)?;
        self.feature_names.clear();

        // Numeric path: impute, then learn scale parameters on filled values
        self.numeric_imputer.fit(df, &self.schema.numeric_columns)?;
        for name in &self.schema.numeric_columns.clone() {
            let values = self.numeric_imputer.fill_column(df, name)?;
            self.numeric_scaler.fit_column(name, &values);
            self.feature_names.push(name.clone());
        }

        // Categorical path: impute, encode, learn per-indicator scale
        self.categorical_imputer
            .fit(df, &self.schema.categorical_columns)?;
        for name in &self.schema.categorical_columns.clone() {
            let values = self.categorical_imputer.fill_column(df, name)?;
            self.encoder.fit_column(name, &values);

            let (names, columns) = self
                .encoder
                .encode_column(name, &values)
                .ok_or(ScorecastError::NotFitted)?;
            for (col_name, col_values) in names.iter().zip(columns.iter()) {
                self.onehot_scaler.fit_column(col_name, col_values);
                self.feature_names.push(col_name.clone());
            }
        }

        self.is_fitted = true;
        debug!(features = self.feature_names.len(), "preprocessor fitted");
        Ok(self)
    }

    /// Apply the fitted transform, producing a row-major feature matrix with
    /// one column per entry of `feature_names()`.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(ScorecastError::NotFitted);
        }
        self.check_schema(df)?;

        let n_rows = df.height();
        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(self.feature_names.len());

        for name in &self.schema.numeric_columns {
            let mut values = self.numeric_imputer.fill_column(df, name)?;
            self.numeric_scaler.transform_column(name, &mut values)?;
            columns.push(values);
        }

        for name in &self.schema.categorical_columns {
            let values = self.categorical_imputer.fill_column(df, name)?;
            let (names, encoded) = self
                .encoder
                .encode_column(name, &values)
                .ok_or(ScorecastError::NotFitted)?;
            for (col_name, mut col_values) in names.iter().zip(encoded.into_iter()) {
                self.onehot_scaler
                    .transform_column(col_name, &mut col_values)?;
                columns.push(col_values);
            }
        }

        let n_cols = columns.len();
        let col_refs: Vec<&[f64]> = columns.iter().map(|c| c.as_slice()).collect();
        Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
            col_refs[c][r]
        }))
    }

    /// Fit and transform in one step.
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Extract the target column as a float vector.
    pub fn target_vector(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let name = &self.schema.target_column;
        let column = df
            .column(name)
            .map_err(|_| ScorecastError::ColumnNotFound(name.clone()))?;
        let casted = column
            .as_materialized_series()
            .cast(&DataType::Float64)
            .map_err(|e| ScorecastError::DataError(e.to_string()))?;
        let values: Vec<f64> = casted
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect();
        Ok(Array1::from_vec(values))
    }

    /// Output column names, numeric first, then one-hot blocks in declared
    /// categorical order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn schema(&self) -> &SchemaConfig {
        &self.schema
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Every declared feature column must be present; the target is only
    /// required where it is actually read.
    fn check_schema(&self, df: &DataFrame) -> Result<()> {
        for name in self.schema.feature_columns() {
            if df.column(name).is_err() {
                return Err(ScorecastError::ColumnNotFound(name.clone()));
            }
        }
        Ok(())
    }
}
