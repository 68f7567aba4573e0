//! Regression models, hyperparameter grids, and the selection loop.

pub mod adaboost;
pub mod cross_validation;
pub mod decision_tree;
pub mod gradient_boosting;
pub mod grid;
pub mod knn;
pub mod linear;
pub mod random_forest;
pub mod selection;

pub use adaboost::AdaBoostRegressor;
pub use cross_validation::{FoldSplit, KFold};
pub use decision_tree::DecisionTreeRegressor;
pub use gradient_boosting::GradientBoostingRegressor;
pub use grid::{floats, ints, ParamGrid, ParamSet, ParamValue};
pub use knn::KnnRegressor;
pub use linear::{LassoRegression, LinearRegression, RidgeRegression};
pub use random_forest::RandomForestRegressor;
pub use selection::{select_model, ModelScore, Selection};

use crate::error::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// One of the supported regressors, dispatched by variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RegressorKind {
    Linear(LinearRegression),
    Ridge(RidgeRegression),
    Lasso(LassoRegression),
    DecisionTree(DecisionTreeRegressor),
    RandomForest(RandomForestRegressor),
    Knn(KnnRegressor),
    GradientBoosting(GradientBoostingRegressor),
    AdaBoost(AdaBoostRegressor),
}

impl RegressorKind {
    pub fn name(&self) -> &'static str {
        match self {
            RegressorKind::Linear(_) => "linear_regression",
            RegressorKind::Ridge(_) => "ridge",
            RegressorKind::Lasso(_) => "lasso",
            RegressorKind::DecisionTree(_) => "decision_tree",
            RegressorKind::RandomForest(_) => "random_forest",
            RegressorKind::Knn(_) => "k_neighbors",
            RegressorKind::GradientBoosting(_) => "gradient_boosting",
            RegressorKind::AdaBoost(_) => "adaboost",
        }
    }

    pub fn apply_params(&mut self, params: &ParamSet) -> Result<()> {
        match self {
            RegressorKind::Linear(m) => m.apply_params(params),
            RegressorKind::Ridge(m) => m.apply_params(params),
            RegressorKind::Lasso(m) => m.apply_params(params),
            RegressorKind::DecisionTree(m) => m.apply_params(params),
            RegressorKind::RandomForest(m) => m.apply_params(params),
            RegressorKind::Knn(m) => m.apply_params(params),
            RegressorKind::GradientBoosting(m) => m.apply_params(params),
            RegressorKind::AdaBoost(m) => m.apply_params(params),
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        match self {
            RegressorKind::Linear(m) => m.fit(x, y),
            RegressorKind::Ridge(m) => m.fit(x, y),
            RegressorKind::Lasso(m) => m.fit(x, y),
            RegressorKind::DecisionTree(m) => m.fit(x, y),
            RegressorKind::RandomForest(m) => m.fit(x, y),
            RegressorKind::Knn(m) => m.fit(x, y),
            RegressorKind::GradientBoosting(m) => m.fit(x, y),
            RegressorKind::AdaBoost(m) => m.fit(x, y),
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            RegressorKind::Linear(m) => m.predict(x),
            RegressorKind::Ridge(m) => m.predict(x),
            RegressorKind::Lasso(m) => m.predict(x),
            RegressorKind::DecisionTree(m) => m.predict(x),
            RegressorKind::RandomForest(m) => m.predict(x),
            RegressorKind::Knn(m) => m.predict(x),
            RegressorKind::GradientBoosting(m) => m.predict(x),
            RegressorKind::AdaBoost(m) => m.predict(x),
        }
    }
}

/// A model entered into the selection loop, with its search grid.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub name: String,
    pub prototype: RegressorKind,
    pub grid: ParamGrid,
}

impl Candidate {
    pub fn new(prototype: RegressorKind, grid: ParamGrid) -> Self {
        Self {
            name: prototype.name().to_string(),
            prototype,
            grid,
        }
    }
}

/// The default candidate roster. Order is significant: ties on test score
/// resolve to the earliest entry.
pub fn default_candidates() -> Vec<Candidate> {
    vec![
        Candidate::new(
            RegressorKind::Linear(LinearRegression::new()),
            ParamGrid::new(),
        ),
        Candidate::new(
            RegressorKind::Ridge(RidgeRegression::new()),
            ParamGrid::new().with("alpha", floats(&[0.01, 0.1, 1.0, 10.0])),
        ),
        Candidate::new(
            RegressorKind::Lasso(LassoRegression::new()),
            ParamGrid::new().with("alpha", floats(&[0.01, 0.1, 1.0])),
        ),
        Candidate::new(
            RegressorKind::DecisionTree(DecisionTreeRegressor::new()),
            ParamGrid::new().with("max_depth", ints(&[3, 5, 8])),
        ),
        Candidate::new(
            RegressorKind::RandomForest(RandomForestRegressor::default()),
            ParamGrid::new().with("n_estimators", ints(&[8, 16, 32, 64, 128])),
        ),
        Candidate::new(
            RegressorKind::Knn(KnnRegressor::default()),
            ParamGrid::new().with("n_neighbors", ints(&[3, 5, 7, 9])),
        ),
        Candidate::new(
            RegressorKind::GradientBoosting(GradientBoostingRegressor::new()),
            ParamGrid::new()
                .with("learning_rate", floats(&[0.01, 0.05, 0.1]))
                .with("n_estimators", ints(&[50, 100])),
        ),
        Candidate::new(
            RegressorKind::AdaBoost(AdaBoostRegressor::new()),
            ParamGrid::new()
                .with("learning_rate", floats(&[0.01, 0.1, 0.5]))
                .with("n_estimators", ints(&[32, 64])),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roster_names_are_unique() {
        let candidates = default_candidates();
        let mut names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), candidates.len());
    }

    #[test]
    fn test_roster_grids_expand() {
        for candidate in default_candidates() {
            let sets = candidate.grid.expand();
            assert!(!sets.is_empty(), "{} expanded to nothing", candidate.name);
            let mut proto = candidate.prototype.clone();
            for set in &sets {
                proto.apply_params(set).unwrap();
            }
        }
    }
}
