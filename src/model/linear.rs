//! Linear regressors: ordinary least squares, ridge, and lasso

use crate::error::{Result, ScorecastError};
use crate::model::grid::ParamSet;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Cholesky solve of the symmetric positive-definite system `a x = b`.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    let mut l: Array2<f64> = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward then backward substitution
    let mut y: Array1<f64> = Array1::zeros(n);
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[[i, j]] * y[j]).sum();
        y[i] = (b[i] - sum) / l[[i, i]];
    }
    let mut x: Array1<f64> = Array1::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| l[[j, i]] * x[j]).sum();
        x[i] = (y[i] - sum) / l[[i, i]];
    }
    Some(x)
}

/// Gauss-Jordan solve used when the normal matrix is not positive definite.
fn gauss_jordan_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut aug = Array2::zeros((n, n + 1));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = a[[i, j]];
        }
        aug[[i, n]] = b[i];
    }

    for col in 0..n {
        let mut pivot_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[pivot_row, col]].abs() {
                pivot_row = row;
            }
        }
        if aug[[pivot_row, col]].abs() < 1e-12 {
            return None;
        }
        if pivot_row != col {
            for j in 0..=n {
                let tmp = aug[[col, j]];
                aug[[col, j]] = aug[[pivot_row, j]];
                aug[[pivot_row, j]] = tmp;
            }
        }
        let pivot = aug[[col, col]];
        for j in 0..=n {
            aug[[col, j]] /= pivot;
        }
        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..=n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    Some(Array1::from_iter((0..n).map(|i| aug[[i, n]])))
}

/// Solve the (optionally ridge-regularized) normal equations
/// `(X^T X + alpha I) w = X^T y`.
fn solve_normal_equations(x: &Array2<f64>, y: &Array1<f64>, alpha: f64) -> Result<Array1<f64>> {
    let mut xtx = x.t().dot(x);
    if alpha > 0.0 {
        for i in 0..xtx.nrows() {
            xtx[[i, i]] += alpha;
        }
    }
    let xty = x.t().dot(y);

    if let Some(solution) = cholesky_solve(&xtx, &xty).or_else(|| gauss_jordan_solve(&xtx, &xty)) {
        return Ok(solution);
    }

    // One-hot blocks whose indicators sum to one make the centered normal
    // matrix rank-deficient. A tiny diagonal jitter recovers a solution
    // close to the minimum-norm least squares fit.
    let n = xtx.nrows();
    let trace: f64 = (0..n).map(|i| xtx[[i, i]]).sum();
    let jitter = 1e-8 * (trace / n as f64).max(1.0);
    for i in 0..n {
        xtx[[i, i]] += jitter;
    }
    cholesky_solve(&xtx, &xty).ok_or_else(|| {
        ScorecastError::TrainingError("normal equations are singular".to_string())
    })
}

/// Center features and target, fit coefficients on the centered system, and
/// recover the intercept from the means.
fn fit_centered(x: &Array2<f64>, y: &Array1<f64>, alpha: f64) -> Result<(Array1<f64>, f64)> {
    let x_mean = x
        .mean_axis(Axis(0))
        .ok_or_else(|| ScorecastError::TrainingError("empty training matrix".to_string()))?;
    let y_mean = y.mean().unwrap_or(0.0);

    let x_centered = x - &x_mean.clone().insert_axis(Axis(0));
    let y_centered = y - y_mean;

    let coefficients = solve_normal_equations(&x_centered, &y_centered, alpha)?;
    let intercept = y_mean - coefficients.dot(&x_mean);
    Ok((coefficients, intercept))
}

fn check_shapes(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(ScorecastError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    if x.nrows() == 0 {
        return Err(ScorecastError::TrainingError(
            "cannot fit on an empty matrix".to_string(),
        ));
    }
    Ok(())
}

/// Ordinary least squares regression.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearRegression {
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_params(&mut self, params: &ParamSet) -> Result<()> {
        reject_unknown_params("linear_regression", params, &[])
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_shapes(x, y)?;
        let (coefficients, intercept) = fit_centered(x, y, 0.0)?;
        self.coefficients = Some(coefficients);
        self.intercept = intercept;
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or(ScorecastError::NotFitted)?;
        Ok(x.dot(coefficients) + self.intercept)
    }
}

/// L2-regularized linear regression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RidgeRegression {
    pub alpha: f64,
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

impl Default for RidgeRegression {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            coefficients: None,
            intercept: 0.0,
        }
    }
}

impl RidgeRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_params(&mut self, params: &ParamSet) -> Result<()> {
        reject_unknown_params("ridge", params, &["alpha"])?;
        if let Some(value) = params.get("alpha") {
            self.alpha = positive_float("alpha", value)?;
        }
        Ok(())
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_shapes(x, y)?;
        let (coefficients, intercept) = fit_centered(x, y, self.alpha)?;
        self.coefficients = Some(coefficients);
        self.intercept = intercept;
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or(ScorecastError::NotFitted)?;
        Ok(x.dot(coefficients) + self.intercept)
    }
}

/// L1-regularized linear regression, fit by cyclic coordinate descent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LassoRegression {
    pub alpha: f64,
    pub max_iter: usize,
    pub tol: f64,
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

impl Default for LassoRegression {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            max_iter: 1000,
            tol: 1e-6,
            coefficients: None,
            intercept: 0.0,
        }
    }
}

impl LassoRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_params(&mut self, params: &ParamSet) -> Result<()> {
        reject_unknown_params("lasso", params, &["alpha"])?;
        if let Some(value) = params.get("alpha") {
            self.alpha = positive_float("alpha", value)?;
        }
        Ok(())
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_shapes(x, y)?;
        let n_samples = x.nrows() as f64;
        let n_features = x.ncols();

        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| ScorecastError::TrainingError("empty training matrix".to_string()))?;
        let y_mean = y.mean().unwrap_or(0.0);
        let x_centered = x - &x_mean.clone().insert_axis(Axis(0));
        let y_centered = y - y_mean;

        // Per-feature squared norms; constant features stay at zero weight
        let col_norms: Vec<f64> = (0..n_features)
            .map(|j| x_centered.column(j).mapv(|v| v * v).sum())
            .collect();

        let mut w: Array1<f64> = Array1::zeros(n_features);
        let mut residual = y_centered.clone();

        for _ in 0..self.max_iter {
            let mut max_delta = 0.0f64;

            for j in 0..n_features {
                if col_norms[j] == 0.0 {
                    continue;
                }
                let col = x_centered.column(j);
                let rho = col.dot(&residual) + w[j] * col_norms[j];

                // Soft threshold
                let threshold = self.alpha * n_samples;
                let new_w = if rho > threshold {
                    (rho - threshold) / col_norms[j]
                } else if rho < -threshold {
                    (rho + threshold) / col_norms[j]
                } else {
                    0.0
                };

                let delta = new_w - w[j];
                if delta != 0.0 {
                    residual = &residual - &col.mapv(|v| v * delta);
                    w[j] = new_w;
                    max_delta = max_delta.max(delta.abs());
                }
            }

            if max_delta < self.tol {
                break;
            }
        }

        self.intercept = y_mean - w.dot(&x_mean);
        self.coefficients = Some(w);
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or(ScorecastError::NotFitted)?;
        Ok(x.dot(coefficients) + self.intercept)
    }
}

/// Shared validation helpers for parameter application.
pub(crate) fn reject_unknown_params(
    model: &str,
    params: &ParamSet,
    known: &[&str],
) -> Result<()> {
    for name in params.keys() {
        if !known.contains(&name.as_str()) {
            return Err(ScorecastError::InvalidParameter {
                name: name.clone(),
                value: params[name].to_string(),
                reason: format!("not a hyperparameter of {model}"),
            });
        }
    }
    Ok(())
}

pub(crate) fn positive_float(
    name: &str,
    value: &crate::model::grid::ParamValue,
) -> Result<f64> {
    match value.as_f64() {
        Some(v) if v > 0.0 => Ok(v),
        _ => Err(ScorecastError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: "expected a positive number".to_string(),
        }),
    }
}

pub(crate) fn positive_int(
    name: &str,
    value: &crate::model::grid::ParamValue,
) -> Result<usize> {
    match value.as_usize() {
        Some(v) if v > 0 => Ok(v),
        _ => Err(ScorecastError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: "expected a positive integer".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::r2_score;
    use crate::model::grid::ParamValue;
    use ndarray::array;

    fn line_data() -> (Array2<f64>, Array1<f64>) {
        // y = 2 x0 - x1 + 3
        let x = array![
            [0.0, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [1.0, 1.0],
            [2.0, 1.0],
            [3.0, 2.0],
        ];
        let y = x.column(0).mapv(|v| 2.0 * v) - x.column(1).to_owned() + 3.0;
        (x, y)
    }

    #[test]
    fn test_ols_recovers_line() {
        let (x, y) = line_data();
        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        assert!(r2_score(&y, &pred) > 0.999);
    }

    #[test]
    fn test_ridge_shrinks_but_fits() {
        let (x, y) = line_data();
        let mut model = RidgeRegression::new();
        model
            .apply_params(&ParamSet::from([(
                "alpha".to_string(),
                ParamValue::Float(0.1),
            )]))
            .unwrap();
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        assert!(r2_score(&y, &pred) > 0.98);
    }

    #[test]
    fn test_lasso_zeroes_irrelevant_feature() {
        // Third feature is pure noise with zero true weight
        let x = array![
            [0.0, 0.0, 0.3],
            [1.0, 0.0, -0.1],
            [0.0, 1.0, 0.2],
            [1.0, 1.0, -0.3],
            [2.0, 1.0, 0.1],
            [3.0, 2.0, -0.2],
        ];
        let y = x.column(0).mapv(|v| 2.0 * v) - x.column(1).to_owned() + 3.0;

        let mut model = LassoRegression::new();
        model
            .apply_params(&ParamSet::from([(
                "alpha".to_string(),
                ParamValue::Float(0.05),
            )]))
            .unwrap();
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        assert!(r2_score(&y, &pred) > 0.95);
    }

    #[test]
    fn test_collinear_indicator_columns_still_fit() {
        // Columns 1 and 2 are complementary indicators, so the centered
        // normal matrix is singular.
        let x = array![
            [0.0, 1.0, 0.0],
            [1.0, 0.0, 1.0],
            [2.0, 1.0, 0.0],
            [3.0, 0.0, 1.0],
            [4.0, 1.0, 0.0],
            [5.0, 0.0, 1.0],
        ];
        let y = x.column(0).mapv(|v| 3.0 * v) + 1.0;

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        assert!(r2_score(&y, &pred) > 0.999);
    }

    #[test]
    fn test_unknown_param_rejected() {
        let mut model = LinearRegression::new();
        let params = ParamSet::from([("alpha".to_string(), ParamValue::Float(1.0))]);
        assert!(matches!(
            model.apply_params(&params),
            Err(ScorecastError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_predict_before_fit_errors() {
        let model = LinearRegression::new();
        let x = array![[1.0, 2.0]];
        assert!(matches!(
            model.predict(&x),
            Err(ScorecastError::NotFitted)
        ));
    }

    #[test]
    fn test_shape_mismatch_errors() {
        let mut model = LinearRegression::new();
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0, 3.0];
        assert!(matches!(
            model.fit(&x, &y),
            Err(ScorecastError::ShapeError { .. })
        ));
    }
}
