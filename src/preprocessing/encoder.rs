//! One-hot encoding with a stable column ordering

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One-hot encoder for categorical columns.
///
/// Categories are collected at fit time and sorted lexicographically, so
/// the expanded column layout is identical for every table the encoder is
/// later applied to. Values unseen at fit time leave their whole indicator
/// block at zero instead of shifting columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: BTreeMap<String, Vec<String>>,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the sorted distinct values of one column.
    pub fn fit_column(&mut self, name: &str, values: &[String]) {
        let mut cats: Vec<String> = values.to_vec();
        cats.sort();
        cats.dedup();
        self.categories.insert(name.to_string(), cats);
    }

    /// Expand one column into its indicator columns, in fit-time order.
    ///
    /// Returns `(column_names, column_values)`; unseen categories produce an
    /// all-zero row within this block.
    pub fn encode_column(&self, name: &str, values: &[String]) -> Option<(Vec<String>, Vec<Vec<f64>>)> {
        let cats = self.categories.get(name)?;

        let names: Vec<String> = cats.iter().map(|c| format!("{name}={c}")).collect();
        let mut columns: Vec<Vec<f64>> = vec![vec![0.0; values.len()]; cats.len()];

        for (row, value) in values.iter().enumerate() {
            if let Ok(idx) = cats.binary_search(value) {
                columns[idx][row] = 1.0;
            }
        }

        Some((names, columns))
    }

    /// Fit-time categories of a column, if known.
    pub fn categories(&self, name: &str) -> Option<&[String]> {
        self.categories.get(name).map(|c| c.as_slice())
    }

    pub fn is_fitted(&self) -> bool {
        !self.categories.is_empty()
    }
}
