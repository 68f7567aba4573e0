//! Random forest regressor

use crate::error::{Result, ScorecastError};
use crate::model::decision_tree::DecisionTreeRegressor;
use crate::model::grid::ParamSet;
use crate::model::linear::{positive_int, reject_unknown_params};
use ndarray::{Array1, Array2, Axis};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Bagged ensemble of regression trees; predictions are the tree mean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
    pub seed: u64,
    trees: Vec<DecisionTreeRegressor>,
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_leaf: 1,
            seed: 42,
            trees: Vec::new(),
        }
    }
}

impl RandomForestRegressor {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators,
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn apply_params(&mut self, params: &ParamSet) -> Result<()> {
        reject_unknown_params(
            "random_forest",
            params,
            &["n_estimators", "max_depth", "min_samples_leaf"],
        )?;
        if let Some(value) = params.get("n_estimators") {
            self.n_estimators = positive_int("n_estimators", value)?;
        }
        if let Some(value) = params.get("max_depth") {
            self.max_depth = Some(positive_int("max_depth", value)?);
        }
        if let Some(value) = params.get("min_samples_leaf") {
            self.min_samples_leaf = positive_int("min_samples_leaf", value)?;
        }
        Ok(())
    }

    /// Fit `n_estimators` trees on bootstrap resamples, in parallel. Each
    /// tree draws from its own seeded stream so refits are reproducible.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(ScorecastError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        let n = x.nrows();
        if n == 0 {
            return Err(ScorecastError::TrainingError(
                "cannot fit a forest on an empty matrix".to_string(),
            ));
        }

        let base_seed = self.seed;
        let max_depth = self.max_depth;
        let min_samples_leaf = self.min_samples_leaf;

        self.trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(tree_idx as u64));
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

                let x_boot = x.select(Axis(0), &sample);
                let y_boot = Array1::from_iter(sample.iter().map(|&i| y[i]));

                let mut tree = DecisionTreeRegressor::new().with_min_samples_leaf(min_samples_leaf);
                tree.max_depth = max_depth;
                tree.fit(&x_boot, &y_boot)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(ScorecastError::NotFitted);
        }

        let mut total: Array1<f64> = Array1::zeros(x.nrows());
        for tree in &self.trees {
            total = total + tree.predict(x)?;
        }
        Ok(total / self.trees.len() as f64)
    }
}
