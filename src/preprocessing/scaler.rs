//! Column scaling

use crate::error::{Result, ScorecastError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScaleParams {
    center: f64,
    scale: f64,
}

/// Z-score scaler over named columns.
///
/// With `with_mean = false` only the standard deviation is divided out,
/// which keeps one-hot indicator columns sparse-safe the way the original
/// categorical path requires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    with_mean: bool,
    params: BTreeMap<String, ScaleParams>,
}

impl StandardScaler {
    pub fn new(with_mean: bool) -> Self {
        Self {
            with_mean,
            params: BTreeMap::new(),
        }
    }

    /// Learn mean and standard deviation for one named column.
    pub fn fit_column(&mut self, name: &str, values: &[f64]) {
        let n = values.len() as f64;
        let mean = if n > 0.0 {
            values.iter().sum::<f64>() / n
        } else {
            0.0
        };
        let variance = if n > 1.0 {
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
        } else {
            0.0
        };
        let std = variance.sqrt();

        self.params.insert(
            name.to_string(),
            ScaleParams {
                center: if self.with_mean { mean } else { 0.0 },
                // Constant columns pass through unscaled
                scale: if std == 0.0 { 1.0 } else { std },
            },
        );
    }

    /// Scale values of a previously fitted column in place.
    pub fn transform_column(&self, name: &str, values: &mut [f64]) -> Result<()> {
        let params = self
            .params
            .get(name)
            .ok_or_else(|| ScorecastError::NotFitted)?;
        for v in values.iter_mut() {
            *v = (*v - params.center) / params.scale;
        }
        Ok(())
    }

    pub fn is_fitted(&self) -> bool {
        !self.params.is_empty()
    }
}
