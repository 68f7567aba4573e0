//! AdaBoost.R2 regressor
//!
//! Boosts shallow regression trees by reweighting samples toward the rounds'
//! largest absolute errors. Predictions are the weighted median of the
//! ensemble, so a few bad rounds cannot drag the output.

use crate::error::{Result, ScorecastError};
use crate::model::decision_tree::DecisionTreeRegressor;
use crate::model::grid::ParamSet;
use crate::model::linear::{positive_float, positive_int, reject_unknown_params};
use ndarray::{Array1, Array2, Axis};
use rand::distributions::{Distribution, WeightedIndex};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaBoostRegressor {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub seed: u64,
    trees: Vec<DecisionTreeRegressor>,
    alphas: Vec<f64>,
}

impl Default for AdaBoostRegressor {
    fn default() -> Self {
        Self {
            n_estimators: 50,
            learning_rate: 1.0,
            max_depth: 3,
            seed: 42,
            trees: Vec::new(),
            alphas: Vec::new(),
        }
    }
}

impl AdaBoostRegressor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn apply_params(&mut self, params: &ParamSet) -> Result<()> {
        reject_unknown_params(
            "adaboost",
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

    /// Fit with the R2 reweighting scheme: each round resamples the training
    /// data by the current weights, fits a tree, and shifts weight onto the
    /// samples it got most wrong. A round with average loss >= 0.5 stops the
    /// boosting early.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n = x.nrows();
        if n != y.len() {
            return Err(ScorecastError::ShapeError {
                expected: format!("y length = {}", n),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n == 0 {
            return Err(ScorecastError::TrainingError(
                "cannot fit adaboost on an empty matrix".to_string(),
            ));
        }

        self.trees.clear();
        self.alphas.clear();

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut weights = vec![1.0 / n as f64; n];

        for _ in 0..self.n_estimators {
            let dist = WeightedIndex::new(&weights).map_err(|e| {
                ScorecastError::TrainingError(format!("degenerate sample weights: {e}"))
            })?;
            let sample: Vec<usize> = (0..n).map(|_| dist.sample(&mut rng)).collect();
            let x_boot = x.select(Axis(0), &sample);
            let y_boot = Array1::from_iter(sample.iter().map(|&i| y[i]));

            let mut tree = DecisionTreeRegressor::new().with_max_depth(self.max_depth);
            tree.fit(&x_boot, &y_boot)?;

            let predictions = tree.predict(x)?;
            let abs_errors: Vec<f64> = y
                .iter()
                .zip(predictions.iter())
                .map(|(t, p)| (t - p).abs())
                .collect();
            let max_error = abs_errors.iter().cloned().fold(0.0f64, f64::max);

            // Perfect round; keep it with full confidence and stop
            if max_error <= 0.0 {
                self.trees.push(tree);
                self.alphas.push(1.0);
                break;
            }

            let losses: Vec<f64> = abs_errors.iter().map(|e| e / max_error).collect();
            let avg_loss: f64 = weights.iter().zip(losses.iter()).map(|(w, l)| w * l).sum();
            if avg_loss >= 0.5 {
                break;
            }

            let beta = avg_loss / (1.0 - avg_loss);
            self.trees.push(tree);
            self.alphas.push(self.learning_rate * (1.0 / beta).ln());

            for (w, l) in weights.iter_mut().zip(losses.iter()) {
                *w *= beta.powf(self.learning_rate * (1.0 - l));
            }
            let total: f64 = weights.iter().sum();
            if total <= 0.0 {
                break;
            }
            for w in weights.iter_mut() {
                *w /= total;
            }
        }

        if self.trees.is_empty() {
            return Err(ScorecastError::TrainingError(
                "adaboost made no progress in the first round".to_string(),
            ));
        }
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(ScorecastError::NotFitted);
        }

        let per_tree: Vec<Array1<f64>> = self
            .trees
            .iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<Vec<_>>>()?;

        let predictions: Vec<f64> = (0..x.nrows())
            .map(|row| {
                let values: Vec<f64> = per_tree.iter().map(|p| p[row]).collect();
                weighted_median(&values, &self.alphas)
            })
            .collect();
        Ok(Array1::from_vec(predictions))
    }
}

/// Weighted median: the smallest value whose cumulative weight reaches half
/// the total.
fn weighted_median(values: &[f64], weights: &[f64]) -> f64 {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let half = weights.iter().sum::<f64>() / 2.0;
    let mut cumulative = 0.0;
    for &idx in &order {
        cumulative += weights[idx];
        if cumulative >= half {
            return values[idx];
        }
    }
    values[*order.last().unwrap_or(&0)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::r2_score;
    use crate::model::grid::ParamValue;
    use ndarray::array;

    fn ramp_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((40, 1), |(r, _)| r as f64);
        let y = Array1::from_iter((0..40).map(|i| 3.0 * i as f64 + 1.0));
        (x, y)
    }

    #[test]
    fn test_adaboost_fits_ramp() {
        let (x, y) = ramp_data();
        let mut model = AdaBoostRegressor::new().with_seed(7);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        assert!(r2_score(&y, &pred) > 0.9);
    }

    #[test]
    fn test_seeded_fit_is_reproducible() {
        let (x, y) = ramp_data();

        let mut a = AdaBoostRegressor::new().with_seed(3);
        a.fit(&x, &y).unwrap();
        let mut b = AdaBoostRegressor::new().with_seed(3);
        b.fit(&x, &y).unwrap();

        let pa = a.predict(&x).unwrap();
        let pb = b.predict(&x).unwrap();
        for (u, v) in pa.iter().zip(pb.iter()) {
            assert_eq!(u, v);
        }
    }

    #[test]
    fn test_apply_params() {
        let mut model = AdaBoostRegressor::new();
        model
            .apply_params(&ParamSet::from([
                ("n_estimators".to_string(), ParamValue::Int(16)),
                ("learning_rate".to_string(), ParamValue::Float(0.5)),
            ]))
            .unwrap();
        assert_eq!(model.n_estimators, 16);
        assert_eq!(model.learning_rate, 0.5);

        let bad = ParamSet::from([("alpha".to_string(), ParamValue::Float(1.0))]);
        assert!(model.apply_params(&bad).is_err());
    }

    #[test]
    fn test_predict_before_fit_errors() {
        let model = AdaBoostRegressor::new();
        assert!(matches!(
            model.predict(&array![[1.0]]),
            Err(ScorecastError::NotFitted)
        ));
    }

    #[test]
    fn test_weighted_median_prefers_heavy_value() {
        let values = [1.0, 10.0, 100.0];
        let weights = [0.1, 0.2, 5.0];
        assert_eq!(weighted_median(&values, &weights), 100.0);
    }
}
