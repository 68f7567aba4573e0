//! K-nearest-neighbors regressor

use crate::error::{Result, ScorecastError};
use crate::model::grid::ParamSet;
use crate::model::linear::{positive_int, reject_unknown_params};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// KNN regressor with Euclidean distance and uniform neighbor weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnRegressor {
    pub n_neighbors: usize,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
}

impl Default for KnnRegressor {
    fn default() -> Self {
        Self {
            n_neighbors: 5,
            x_train: None,
            y_train: None,
        }
    }
}

impl KnnRegressor {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            ..Self::default()
        }
    }

    pub fn apply_params(&mut self, params: &ParamSet) -> Result<()> {
        reject_unknown_params("knn", params, &["n_neighbors"])?;
        if let Some(value) = params.get("n_neighbors") {
            self.n_neighbors = positive_int("n_neighbors", value)?;
        }
        Ok(())
    }

    /// Lazy learner: fit just stores the training data.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(ScorecastError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        if x.nrows() == 0 {
            return Err(ScorecastError::TrainingError(
                "cannot fit knn on an empty matrix".to_string(),
            ));
        }
        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let x_train = self.x_train.as_ref().ok_or(ScorecastError::NotFitted)?;
        let y_train = self.y_train.as_ref().ok_or(ScorecastError::NotFitted)?;

        let k = self.n_neighbors.min(x_train.nrows());
        let predictions: Vec<f64> = (0..x.nrows())
            .map(|row| {
                let query = x.row(row);
                let mut distances: Vec<(f64, f64)> = x_train
                    .rows()
                    .into_iter()
                    .zip(y_train.iter())
                    .map(|(train_row, &target)| {
                        let dist: f64 = query
                            .iter()
                            .zip(train_row.iter())
                            .map(|(a, b)| (a - b).powi(2))
                            .sum();
                        (dist, target)
                    })
                    .collect();

                distances.select_nth_unstable_by(k - 1, |a, b| {
                    a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal)
                });
                distances[..k].iter().map(|(_, t)| t).sum::<f64>() / k as f64
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }
}
