//! Regression decision tree

use crate::error::{Result, ScorecastError};
use crate::model::grid::ParamSet;
use crate::model::linear::{positive_int, reject_unknown_params};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// A node of the fitted tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// Decision tree regressor splitting on variance reduction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    root: Option<TreeNode>,
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            root: None,
        }
    }
}

/// Best split found for one node.
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    score: f64,
}

impl DecisionTreeRegressor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    pub fn apply_params(&mut self, params: &ParamSet) -> Result<()> {
        reject_unknown_params(
            "decision_tree",
            params,
            &["max_depth", "min_samples_split", "min_samples_leaf"],
        )?;
        if let Some(value) = params.get("max_depth") {
            self.max_depth = Some(positive_int("max_depth", value)?);
        }
        if let Some(value) = params.get("min_samples_split") {
            self.min_samples_split = positive_int("min_samples_split", value)?.max(2);
        }
        if let Some(value) = params.get("min_samples_leaf") {
            self.min_samples_leaf = positive_int("min_samples_leaf", value)?;
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
                "cannot fit a tree on an empty matrix".to_string(),
            ));
        }

        let indices: Vec<usize> = (0..x.nrows()).collect();
        self.root = Some(self.build_node(x, y, &indices, 0));
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(ScorecastError::NotFitted)?;
        let predictions: Vec<f64> = (0..x.nrows())
            .map(|row| {
                let mut node = root;
                loop {
                    match node {
                        TreeNode::Leaf { value } => return *value,
                        TreeNode::Split {
                            feature_idx,
                            threshold,
                            left,
                            right,
                        } => {
                            node = if x[[row, *feature_idx]] <= *threshold {
                                left
                            } else {
                                right
                            };
                        }
                    }
                }
            })
            .collect();
        Ok(Array1::from_vec(predictions))
    }

    fn build_node(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
    ) -> TreeNode {
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;

        let depth_reached = self.max_depth.is_some_and(|d| depth >= d);
        if depth_reached || indices.len() < self.min_samples_split {
            return TreeNode::Leaf { value: mean };
        }

        let Some(split) = self.best_split(x, y, indices) else {
            return TreeNode::Leaf { value: mean };
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, split.feature_idx]] <= split.threshold);

        if left_idx.len() < self.min_samples_leaf || right_idx.len() < self.min_samples_leaf {
            return TreeNode::Leaf { value: mean };
        }

        TreeNode::Split {
            feature_idx: split.feature_idx,
            threshold: split.threshold,
            left: Box::new(self.build_node(x, y, &left_idx, depth + 1)),
            right: Box::new(self.build_node(x, y, &right_idx, depth + 1)),
        }
    }

    /// Scan every feature for the threshold minimizing the weighted sum of
    /// child squared errors, using prefix sums over the sorted column.
    fn best_split(&self, x: &Array2<f64>, y: &Array1<f64>, indices: &[usize]) -> Option<SplitCandidate> {
        let n = indices.len();
        let mut best: Option<SplitCandidate> = None;

        for feature_idx in 0..x.ncols() {
            let mut order: Vec<usize> = indices.to_vec();
            order.sort_by(|&a, &b| {
                x[[a, feature_idx]]
                    .partial_cmp(&x[[b, feature_idx]])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            let total_sum: f64 = order.iter().map(|&i| y[i]).sum();
            let total_sq: f64 = order.iter().map(|&i| y[i] * y[i]).sum();

            for pos in 0..n - 1 {
                let yi = y[order[pos]];
                left_sum += yi;
                left_sq += yi * yi;

                let current = x[[order[pos], feature_idx]];
                let next = x[[order[pos + 1], feature_idx]];
                if current == next {
                    continue;
                }

                let left_n = (pos + 1) as f64;
                let right_n = (n - pos - 1) as f64;
                if (pos + 1) < self.min_samples_leaf || (n - pos - 1) < self.min_samples_leaf {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / left_n)
                    + (right_sq - right_sum * right_sum / right_n);

                if best.as_ref().is_none_or(|b| sse < b.score) {
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold: (current + next) / 2.0,
                        score: sse,
                    });
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::r2_score;
    use crate::model::grid::ParamValue;
    use ndarray::array;

    fn step_data() -> (Array2<f64>, Array1<f64>) {
        let x = array![[1.0], [2.0], [3.0], [4.0], [10.0], [11.0], [12.0], [13.0]];
        let y = array![5.0, 5.0, 5.0, 5.0, 20.0, 20.0, 20.0, 20.0];
        (x, y)
    }

    #[test]
    fn test_fits_step_function() {
        let (x, y) = step_data();
        let mut tree = DecisionTreeRegressor::new();
        tree.fit(&x, &y).unwrap();
        let pred = tree.predict(&x).unwrap();
        assert!(r2_score(&y, &pred) > 0.999);
    }

    #[test]
    fn test_max_depth_limits_tree() {
        let (x, y) = step_data();
        let mut stump = DecisionTreeRegressor::new().with_max_depth(1);
        stump.fit(&x, &y).unwrap();

        let pred = stump.predict(&array![[1.0], [12.0]]).unwrap();
        assert!((pred[0] - 5.0).abs() < 1e-9);
        assert!((pred[1] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_apply_params() {
        let mut tree = DecisionTreeRegressor::new();
        let params = ParamSet::from([
            ("max_depth".to_string(), ParamValue::Int(3)),
            ("min_samples_leaf".to_string(), ParamValue::Int(2)),
        ]);
        tree.apply_params(&params).unwrap();
        assert_eq!(tree.max_depth, Some(3));
        assert_eq!(tree.min_samples_leaf, 2);

        let bad = ParamSet::from([("n_neighbors".to_string(), ParamValue::Int(3))]);
        assert!(tree.apply_params(&bad).is_err());
    }

    #[test]
    fn test_constant_target_yields_single_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![7.0, 7.0, 7.0];
        let mut tree = DecisionTreeRegressor::new();
        tree.fit(&x, &y).unwrap();
        let pred = tree.predict(&array![[99.0]]).unwrap();
        assert!((pred[0] - 7.0).abs() < 1e-12);
    }
}
