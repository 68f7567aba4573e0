//! Model selection: grid search with cross-validation over a candidate
//! roster, scored on a held-out test set.

use crate::config::SelectionConfig;
use crate::error::{Result, ScorecastError};
use crate::metrics::r2_score;
use crate::model::grid::ParamSet;
use crate::model::{Candidate, KFold, RegressorKind};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Per-candidate scores, kept in evaluation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelScore {
    pub name: String,
    pub test_r2: f64,
    pub train_r2: f64,
}

/// Outcome of a selection run: the winning fitted model and the full report.
#[derive(Debug, Clone)]
pub struct Selection {
    pub best_name: String,
    pub best_score: f64,
    pub model: RegressorKind,
    pub report: Vec<ModelScore>,
}

/// Run every candidate through grid search and pick the winner.
///
/// For each candidate the grid is expanded into parameter sets; each set is
/// scored by k-fold cross-validation on the training data and the best set
/// is refit on the full training split. The held-out test score decides the
/// winner. Ties keep the earlier candidate. If even the best score falls
/// below the configured floor, no model is accepted.
pub fn select_model(
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    x_test: &Array2<f64>,
    y_test: &Array1<f64>,
    candidates: Vec<Candidate>,
    config: &SelectionConfig,
) -> Result<Selection> {
    if candidates.is_empty() {
        return Err(ScorecastError::TrainingError(
            "candidate roster is empty".to_string(),
        ));
    }

    let mut report = Vec::with_capacity(candidates.len());
    let mut fitted: Vec<RegressorKind> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let params = tune_candidate(&candidate, x_train, y_train, config)?;
        debug!(model = %candidate.name, params = %format_params(&params), "grid winner");

        let mut model = candidate.prototype.clone();
        model.apply_params(&params)?;
        model.fit(x_train, y_train)?;

        let train_r2 = r2_score(y_train, &model.predict(x_train)?);
        let test_r2 = r2_score(y_test, &model.predict(x_test)?);
        info!(model = %candidate.name, test_r2, train_r2, "candidate evaluated");

        report.push(ModelScore {
            name: candidate.name,
            test_r2,
            train_r2,
        });
        fitted.push(model);
    }

    let mut best_idx = 0;
    for idx in 1..report.len() {
        if report[idx].test_r2 > report[best_idx].test_r2 {
            best_idx = idx;
        }
    }

    let best_score = report[best_idx].test_r2;
    if best_score < config.score_floor {
        return Err(ScorecastError::NoAcceptableModel {
            best_score,
            floor: config.score_floor,
        });
    }

    let best_name = report[best_idx].name.clone();
    info!(model = %best_name, score = best_score, "selected best model");

    Ok(Selection {
        best_name,
        best_score,
        model: fitted.swap_remove(best_idx),
        report,
    })
}

/// Choose the best parameter set for one candidate via cross-validation.
/// A single-set grid has nothing to compare, so it skips the folds.
fn tune_candidate(
    candidate: &Candidate,
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    config: &SelectionConfig,
) -> Result<ParamSet> {
    let mut sets = candidate.grid.expand();
    if sets.len() == 1 {
        return Ok(sets.remove(0));
    }

    let kfold = KFold::new(config.cv_folds).with_shuffle(config.seed);
    let folds = kfold.split(x_train.nrows())?;

    let mut best: Option<(f64, ParamSet)> = None;
    for set in sets {
        let mut fold_scores = Vec::with_capacity(folds.len());
        for fold in &folds {
            let x_fit = x_train.select(Axis(0), &fold.train_indices);
            let y_fit = Array1::from_iter(fold.train_indices.iter().map(|&i| y_train[i]));
            let x_val = x_train.select(Axis(0), &fold.validation_indices);
            let y_val = Array1::from_iter(fold.validation_indices.iter().map(|&i| y_train[i]));

            let mut model = candidate.prototype.clone();
            model.apply_params(&set)?;
            model.fit(&x_fit, &y_fit)?;
            fold_scores.push(r2_score(&y_val, &model.predict(&x_val)?));
        }

        let mean = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
        debug!(model = %candidate.name, params = %format_params(&set), cv_r2 = mean, "cv fold mean");

        if best.as_ref().is_none_or(|(score, _)| mean > *score) {
            best = Some((mean, set));
        }
    }

    // expand() always yields at least one set, so best is populated
    best.map(|(_, set)| set).ok_or_else(|| {
        ScorecastError::TrainingError(format!("grid for {} produced no parameter sets", candidate.name))
    })
}

fn format_params(params: &ParamSet) -> String {
    if params.is_empty() {
        return "{}".to_string();
    }
    let parts: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::grid::{floats, ParamGrid};
    use crate::model::{KnnRegressor, LinearRegression, RidgeRegression};
    use ndarray::Array2;

    fn features(row: usize) -> (f64, f64) {
        (row as f64, ((row * 3) % 5) as f64)
    }

    fn target(row: usize) -> f64 {
        let (a, b) = features(row);
        2.0 * a - b + 5.0
    }

    fn linear_data() -> (Array2<f64>, Array1<f64>, Array2<f64>, Array1<f64>) {
        let x_train = Array2::from_shape_fn((24, 2), |(r, c)| {
            let (a, b) = features(r);
            if c == 0 { a } else { b }
        });
        let y_train = Array1::from_iter((0..24).map(target));
        let x_test = Array2::from_shape_fn((8, 2), |(r, c)| {
            let (a, b) = features(r + 24);
            if c == 0 { a } else { b }
        });
        let y_test = Array1::from_iter((24..32).map(target));
        (x_train, y_train, x_test, y_test)
    }

    fn config() -> SelectionConfig {
        SelectionConfig {
            cv_folds: 3,
            score_floor: 0.6,
            seed: 42,
        }
    }

    #[test]
    fn test_selects_well_fitting_model() {
        let (x_train, y_train, x_test, y_test) = linear_data();
        let candidates = vec![
            Candidate::new(
                RegressorKind::Linear(LinearRegression::new()),
                ParamGrid::new(),
            ),
            Candidate::new(
                RegressorKind::Ridge(RidgeRegression::new()),
                ParamGrid::new().with("alpha", floats(&[0.01, 1.0])),
            ),
        ];

        let selection =
            select_model(&x_train, &y_train, &x_test, &y_test, candidates, &config()).unwrap();
        assert!(selection.best_score > 0.99);
        assert_eq!(selection.report.len(), 2);
        assert!(selection
            .report
            .iter()
            .any(|s| s.name == selection.best_name));
    }

    #[test]
    fn test_tie_keeps_first_candidate() {
        let (x_train, y_train, x_test, y_test) = linear_data();
        // Two identical candidates under different names score identically.
        let mut first = Candidate::new(
            RegressorKind::Linear(LinearRegression::new()),
            ParamGrid::new(),
        );
        first.name = "first".to_string();
        let mut second = Candidate::new(
            RegressorKind::Linear(LinearRegression::new()),
            ParamGrid::new(),
        );
        second.name = "second".to_string();

        let selection = select_model(
            &x_train,
            &y_train,
            &x_test,
            &y_test,
            vec![first, second],
            &config(),
        )
        .unwrap();
        assert_eq!(selection.best_name, "first");
    }

    #[test]
    fn test_floor_rejects_weak_roster() {
        let (x_train, y_train, _, _) = linear_data();
        // Constant-ish test target the trained model cannot track.
        let x_test = Array2::from_shape_fn((8, 2), |(r, c)| ((r * 7 + c * 13) % 5) as f64);
        let y_test = Array1::from_iter((0..8).map(|r| if r % 2 == 0 { -500.0 } else { 500.0 }));

        let candidates = vec![Candidate::new(
            RegressorKind::Knn(KnnRegressor::new(3)),
            ParamGrid::new(),
        )];

        let err = select_model(&x_train, &y_train, &x_test, &y_test, candidates, &config())
            .unwrap_err();
        assert!(matches!(err, ScorecastError::NoAcceptableModel { .. }));
    }

    #[test]
    fn test_empty_roster_errors() {
        let (x_train, y_train, x_test, y_test) = linear_data();
        assert!(select_model(&x_train, &y_train, &x_test, &y_test, vec![], &config()).is_err());
    }
}
