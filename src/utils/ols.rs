//! Ordinary and weighted least squares on an explicit design matrix.
//!
//! Used by the regression forecasters (trend/seasonal regression, harmonic
//! regression) and by the IRLS loop of logistic regression.

use crate::error::{ForecastError, Result};

/// Fitted least-squares model.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// One coefficient per design column.
    pub coefficients: Vec<f64>,
    /// Residual variance, `SSE / (n - k)`.
    pub residual_variance: f64,
    /// Residual degrees of freedom.
    pub df: usize,
    xtx_inverse: Vec<Vec<f64>>,
}

impl OlsFit {
    /// Linear predictor for one design row.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        dot(&self.coefficients, row)
    }

    /// Variance of a new observation at `row`: `σ²(1 + x'(X'X)⁻¹x)`.
    pub fn prediction_variance(&self, row: &[f64]) -> f64 {
        let leverage: f64 = self
            .xtx_inverse
            .iter()
            .zip(row.iter())
            .map(|(inv_row, xi)| xi * dot(inv_row, row))
            .sum();
        self.residual_variance * (1.0 + leverage)
    }
}

/// Fit `y = X β` by ordinary least squares.
///
/// `rows` holds one design row per observation; include a column of ones
/// for an intercept.
pub fn ols_fit(rows: &[Vec<f64>], y: &[f64]) -> Result<OlsFit> {
    let weights = vec![1.0; y.len()];
    let (xtx, coefficients) = solve_normal_equations(rows, y, &weights)?;

    let k = coefficients.len();
    let n = y.len();
    let sse: f64 = rows
        .iter()
        .zip(y.iter())
        .map(|(row, yi)| (yi - dot(&coefficients, row)).powi(2))
        .sum();
    let df = n - k;

    let mut xtx_inverse = vec![vec![0.0; k]; k];
    for j in 0..k {
        let mut unit = vec![0.0; k];
        unit[j] = 1.0;
        let column = solve_symmetric(&xtx, &unit).ok_or_else(singular)?;
        for (i, value) in column.into_iter().enumerate() {
            xtx_inverse[i][j] = value;
        }
    }

    Ok(OlsFit {
        coefficients,
        residual_variance: sse / df as f64,
        df,
        xtx_inverse,
    })
}

/// Solve the weighted normal equations `X'WX β = X'Wy`.
pub(crate) fn weighted_least_squares(
    rows: &[Vec<f64>],
    y: &[f64],
    weights: &[f64],
) -> Result<Vec<f64>> {
    solve_normal_equations(rows, y, weights).map(|(_, beta)| beta)
}

fn solve_normal_equations(
    rows: &[Vec<f64>],
    y: &[f64],
    weights: &[f64],
) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
    let n = y.len();
    if rows.len() != n || weights.len() != n {
        return Err(ForecastError::misaligned(format!(
            "{} design rows and {} weights for {} observations",
            rows.len(),
            weights.len(),
            n
        )));
    }
    let k = rows.first().map(|r| r.len()).unwrap_or(0);
    if k == 0 {
        return Err(ForecastError::InvalidParameter(
            "design matrix has no columns".to_string(),
        ));
    }
    if n <= k {
        return Err(ForecastError::InsufficientData {
            needed: k + 1,
            got: n,
        });
    }
    if rows.iter().any(|r| r.len() != k) {
        return Err(ForecastError::misaligned("design rows differ in width"));
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for ((row, &yi), &w) in rows.iter().zip(y.iter()).zip(weights.iter()) {
        for i in 0..k {
            let wxi = w * row[i];
            xty[i] += wxi * yi;
            for j in 0..=i {
                xtx[i][j] += wxi * row[j];
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[j][i] = xtx[i][j];
        }
        // Small ridge on the diagonal keeps near-collinear designs solvable.
        xtx[i][i] += 1e-8;
    }

    let beta = solve_symmetric(&xtx, &xty).ok_or_else(singular)?;
    Ok((xtx, beta))
}

fn singular() -> ForecastError {
    ForecastError::InvalidParameter(
        "least squares failed: design matrix is not of full rank".to_string(),
    )
}

/// Solve `A x = b` for symmetric positive definite `A` by Cholesky.
pub(crate) fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    let mut z = vec![0.0; n];
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[i][j] * z[j]).sum();
        z[i] = (b[i] - sum) / l[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| l[j][i] * x[j]).sum();
        x[i] = (z[i] - sum) / l[i][i];
    }

    Some(x)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
