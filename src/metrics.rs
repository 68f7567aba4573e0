//! Regression metrics

use ndarray::Array1;

/// Coefficient of determination.
///
/// Returns a value in (-inf, 1.0]; a constant target (zero total variance)
/// scores 0.0 rather than dividing by zero.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let n = y_true.len() as f64;
    if n == 0.0 {
        return 0.0;
    }

    let y_mean = y_true.sum() / n;
    let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    }
}

/// Root mean squared error, reported alongside R² in training logs.
pub fn rmse(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let n = y_true.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let mse: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / n;
    mse.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_perfect_fit() {
        let y = array![1.0, 2.0, 3.0, 4.0];
        assert!((r2_score(&y, &y) - 1.0).abs() < 1e-12);
        assert!(rmse(&y, &y).abs() < 1e-12);
    }

    #[test]
    fn test_mean_predictor_scores_zero() {
        let y_true = array![1.0, 2.0, 3.0, 4.0];
        let y_pred = array![2.5, 2.5, 2.5, 2.5];
        assert!(r2_score(&y_true, &y_pred).abs() < 1e-12);
    }

    #[test]
    fn test_worse_than_mean_is_negative() {
        let y_true = array![1.0, 2.0, 3.0];
        let y_pred = array![3.0, 1.0, 5.0];
        assert!(r2_score(&y_true, &y_pred) < 0.0);
    }

    #[test]
    fn test_constant_target() {
        let y_true = array![2.0, 2.0, 2.0];
        let y_pred = array![1.0, 2.0, 3.0];
        assert_eq!(r2_score(&y_true, &y_pred), 0.0);
    }
}
