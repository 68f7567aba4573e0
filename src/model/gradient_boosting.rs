//! Gradient boosting regressor

use crate::error::{Result, ScorecastError};
use crate::model::decision_tree::DecisionTreeRegressor;
use crate::model::grid::ParamSet;
use crate::model::linear::{positive_float, positive_int, reject_unknown_params};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Boosted ensemble of shallow regression trees fit on residuals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    init_value: f64,
    trees: Vec<DecisionTreeRegressor>,
}

impl Default for GradientBoostingRegressor {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            init_value: 0.0,
            trees: Vec::new(),
        }
    }
}

impl GradientBoostingRegressor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_params(&mut self, params: &ParamSet) -> Result<()> {
        reject_unknown_params(
            "gradient_boosting",
            params,
            &["n_estimators", "learning_rate", "max_depth"],
        )?;
        if let Some(value) = params.get("n_estimators") {
            self.n_estimators = positive_int("n_estimators", value)?;
        }
        if let Some(value) = params.get("learning_rate") {
            self.learning_rate = positive_float("learning_rate", value)?;
        }
        if let Some(value) = params.get("max_depth") {
            self.max_depth = positive_int("max_depth", value)?;
        }
        Ok(())
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(ScorecastError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        if x.nrows() == 0 {
            return Err(ScorecastError::TrainingError(
                "cannot fit boosting on an empty matrix".to_string(),
            ));
        }

        self.init_value = y.mean().unwrap_or(0.0);
        self.trees = Vec::with_capacity(self.n_estimators);

        let mut residual = y.mapv(|v| v - self.init_value);
        for _ in 0..self.n_estimators {
            let mut tree = DecisionTreeRegressor::new().with_max_depth(self.max_depth);
            tree.fit(x, &residual)?;
            let update = tree.predict(x)?;
            residual = residual - update.mapv(|v| v * self.learning_rate);
            self.trees.push(tree);
        }

        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(ScorecastError::NotFitted);
        }

        let mut predictions: Array1<f64> = Array1::from_elem(x.nrows(), self.init_value);
        for tree in &self.trees {
            predictions = predictions + tree.predict(x)?.mapv(|v| v * self.learning_rate);
        }
        Ok(predictions)
    }
}
