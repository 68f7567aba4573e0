//! Missing value imputation

use crate::error::{Result, ScorecastError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashMap;

/// Median imputer for numeric columns.
///
/// Fill values are learned at fit time and reused verbatim for every later
/// table, so train, test, and inference rows see the same treatment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NumericImputer {
    fills: BTreeMap<String, f64>,
}

impl NumericImputer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the median of each named column.
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<()> {
        self.fills.clear();
        for name in columns {
            let ca = numeric_chunked(df, name)?;
            let median = ca.median().unwrap_or(0.0);
            self.fills.insert(name.clone(), median);
        }
        Ok(())
    }

    /// Extract a column as `f64` values with nulls replaced by the stored fill.
    pub fn fill_column(&self, df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        let fill = *self
            .fills
            .get(name)
            .ok_or_else(|| ScorecastError::NotFitted)?;
        let ca = numeric_chunked(df, name)?;
        Ok(ca.into_iter().map(|v| v.unwrap_or(fill)).collect())
    }

    pub fn is_fitted(&self) -> bool {
        !self.fills.is_empty()
    }
}

/// Most-frequent-value imputer for categorical (string) columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoricalImputer {
    fills: BTreeMap<String, String>,
}

impl CategoricalImputer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the mode of each named column. Ties break on the smaller string
    /// so refitting the same data always yields the same fill.
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<()> {
        self.fills.clear();
        for name in columns {
            let ca = string_chunked(df, name)?;

            let mut counts: HashMap<&str, usize> = HashMap::new();
            for val in ca.into_iter().flatten() {
                *counts.entry(val).or_insert(0) += 1;
            }
            let mode = counts
                .into_iter()
                .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.cmp(a)))
                .map(|(v, _)| v.to_string())
                .unwrap_or_default();

            self.fills.insert(name.clone(), mode);
        }
        Ok(())
    }

    /// Extract a column as strings with nulls replaced by the stored mode.
    pub fn fill_column(&self, df: &DataFrame, name: &str) -> Result<Vec<String>> {
        let fill = self
            .fills
            .get(name)
            .ok_or_else(|| ScorecastError::NotFitted)?;
        let ca = string_chunked(df, name)?;
        Ok(ca
            .into_iter()
            .map(|v| v.unwrap_or(fill.as_str()).to_string())
            .collect())
    }

    pub fn is_fitted(&self) -> bool {
        !self.fills.is_empty()
    }
}

/// Fetch a column cast to Float64, erroring on absent or non-numeric columns.
fn numeric_chunked(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let column = df
        .column(name)
        .map_err(|_| ScorecastError::ColumnNotFound(name.to_string()))?;
    let casted = column
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|_| {
            ScorecastError::PreprocessingError(format!("column {name} is not numeric"))
        })?;
    Ok(casted.f64()?.clone())
}

/// Fetch a string column, erroring on absent or non-string columns.
fn string_chunked(df: &DataFrame, name: &str) -> Result<StringChunked> {
    let column = df
        .column(name)
        .map_err(|_| ScorecastError::ColumnNotFound(name.to_string()))?;
    let ca = column.as_materialized_series().str().map_err(|_| {
        ScorecastError::PreprocessingError(format!("column {name} is not a string column"))
    })?;
    Ok(ca.clone())
}
