//! Ordinary least squares regression
//!
//! Small dense solver used by the unit-root test and by the ARIMA
//! initial estimates. Matrices are row-major `Vec<Vec<f64>>`; the
//! problems solved here have a handful of columns.

use crate::{MathError, Result};

/// Result of an ordinary least squares fit
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Estimated coefficients, one per regressor column
    pub coefficients: Vec<f64>,
    /// Standard errors of the coefficients
    pub standard_errors: Vec<f64>,
    /// In-sample residuals `y - X b`
    pub residuals: Vec<f64>,
    /// Sum of squared residuals
    pub ssr: f64,
    /// Number of observations
    pub nobs: usize,
}

impl OlsFit {
    /// Number of estimated parameters
    pub fn n_params(&self) -> usize {
        self.coefficients.len()
    }

    /// Residual variance with a degrees-of-freedom correction
    pub fn sigma_squared(&self) -> f64 {
        let dof = self.nobs.saturating_sub(self.n_params()).max(1);
        self.ssr / dof as f64
    }

    /// t statistic of coefficient `index`
    pub fn t_statistic(&self, index: usize) -> Result<f64> {
        let coefficient = self.coefficients.get(index).ok_or_else(|| {
            MathError::InvalidInput(format!("No coefficient at index {}", index))
        })?;
        let se = self.standard_errors[index];
        if se <= 0.0 || !se.is_finite() {
            return Err(MathError::CalculationError(format!(
                "Standard error of coefficient {} is not positive",
                index
            )));
        }
        Ok(coefficient / se)
    }

    /// Gaussian log-likelihood evaluated at the OLS estimate
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        let ssr = self.ssr.max(f64::MIN_POSITIVE);
        -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.n_params() as f64
    }
}

/// Fit `y = X b + e` by ordinary least squares.
///
/// `rows[i]` holds the regressors of observation `i`. Fails when there are
/// no more observations than regressors or the design is singular.
pub fn ordinary_least_squares(rows: &[Vec<f64>], y: &[f64]) -> Result<OlsFit> {
    if rows.len() != y.len() {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but response has {} values",
            rows.len(),
            y.len()
        )));
    }

    let k = rows.first().map(|r| r.len()).unwrap_or(0);
    if k == 0 {
        return Err(MathError::InvalidInput(
            "Design matrix has no columns".to_string(),
        ));
    }
    if rows.iter().any(|r| r.len() != k) {
        return Err(MathError::InvalidInput(
            "Design matrix rows have different lengths".to_string(),
        ));
    }
    if rows.len() <= k {
        return Err(MathError::InsufficientData {
            required: k + 1,
            actual: rows.len(),
        });
    }

    // Normal equations X'X b = X'y
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &target) in rows.iter().zip(y) {
        for i in 0..k {
            xty[i] += row[i] * target;
            for j in i..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[i][j] = xtx[j][i];
        }
    }

    let inverse = invert_matrix(&xtx)?;
    let coefficients: Vec<f64> = inverse
        .iter()
        .map(|inv_row| inv_row.iter().zip(&xty).map(|(a, b)| a * b).sum())
        .collect();

    let residuals: Vec<f64> = rows
        .iter()
        .zip(y)
        .map(|(row, &target)| {
            let fitted: f64 = row.iter().zip(&coefficients).map(|(x, b)| x * b).sum();
            target - fitted
        })
        .collect();
    let ssr: f64 = residuals.iter().map(|r| r * r).sum();

    let mut fit = OlsFit {
        coefficients,
        standard_errors: Vec::new(),
        residuals,
        ssr,
        nobs: y.len(),
    };
    let sigma2 = fit.sigma_squared();
    fit.standard_errors = (0..k)
        .map(|i| (sigma2 * inverse[i][i]).max(0.0).sqrt())
        .collect();

    Ok(fit)
}

/// Solve `a x = b` by Gaussian elimination with partial pivoting
pub fn solve_linear_system(a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>> {
    let n = b.len();
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput(
            "Linear system must be square and match the right-hand side".to_string(),
        ));
    }

    let mut m: Vec<Vec<f64>> = a
        .iter()
        .zip(b)
        .map(|(row, &rhs)| {
            let mut augmented = row.clone();
            augmented.push(rhs);
            augmented
        })
        .collect();
    let tolerance = singularity_tolerance(a);

    for col in 0..n {
        let pivot_row = pivot_index(&m, col);
        if m[pivot_row][col].abs() <= tolerance {
            return Err(MathError::CalculationError(
                "Linear system is singular".to_string(),
            ));
        }
        m.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = m[row][col] / m[col][col];
            if factor != 0.0 {
                for c in col..=n {
                    m[row][c] -= factor * m[col][c];
                }
            }
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|c| m[row][c] * x[c]).sum();
        x[row] = (m[row][n] - tail) / m[row][row];
    }

    Ok(x)
}

/// Invert a square matrix by Gauss-Jordan elimination
pub fn invert_matrix(a: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let n = a.len();
    if a.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput(
            "Only square matrices can be inverted".to_string(),
        ));
    }

    let mut m: Vec<Vec<f64>> = a
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut augmented = row.clone();
            augmented.extend((0..n).map(|j| if i == j { 1.0 } else { 0.0 }));
            augmented
        })
        .collect();
    let tolerance = singularity_tolerance(a);

    for col in 0..n {
        let pivot_row = pivot_index(&m, col);
        if m[pivot_row][col].abs() <= tolerance {
            return Err(MathError::CalculationError(
                "Matrix is singular".to_string(),
            ));
        }
        m.swap(col, pivot_row);

        let pivot = m[col][col];
        for value in m[col].iter_mut() {
            *value /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = m[row][col];
            if factor != 0.0 {
                for c in 0..2 * n {
                    m[row][c] -= factor * m[col][c];
                }
            }
        }
    }

    Ok(m.into_iter().map(|row| row[n..].to_vec()).collect())
}

fn pivot_index(m: &[Vec<f64>], col: usize) -> usize {
    (col..m.len())
        .max_by(|&i, &j| m[i][col].abs().total_cmp(&m[j][col].abs()))
        .unwrap_or(col)
}

fn singularity_tolerance(a: &[Vec<f64>]) -> f64 {
    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    scale * a.len() as f64 * 1e-13
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_simple_line_fit() {
        // y = 2 + 3x with a small alternating disturbance
        let rows: Vec<Vec<f64>> = (0..10).map(|x| vec![1.0, x as f64]).collect();
        let y: Vec<f64> = (0..10)
            .map(|x| 2.0 + 3.0 * x as f64 + if x % 2 == 0 { 0.1 } else { -0.1 })
            .collect();

        let fit = ordinary_least_squares(&rows, &y).unwrap();
        assert_relative_eq!(fit.coefficients[0], 2.0, epsilon = 0.1);
        assert_relative_eq!(fit.coefficients[1], 3.0, epsilon = 0.05);
        assert!(fit.ssr > 0.0);
        assert_eq!(fit.nobs, 10);
        assert!(fit.standard_errors.iter().all(|se| *se > 0.0));
        assert!(fit.t_statistic(1).unwrap() > 10.0);
        assert!(fit.aic().is_finite());
    }

    #[test]
    fn test_singular_design() {
        // Two identical columns
        let rows: Vec<Vec<f64>> = (0..6).map(|x| vec![x as f64, x as f64]).collect();
        let y: Vec<f64> = (0..6).map(|x| x as f64).collect();
        assert!(matches!(
            ordinary_least_squares(&rows, &y),
            Err(MathError::CalculationError(_))
        ));
    }

    #[test]
    fn test_too_few_rows() {
        let rows = vec![vec![1.0, 0.0], vec![1.0, 1.0]];
        assert!(matches!(
            ordinary_least_squares(&rows, &[1.0, 2.0]),
            Err(MathError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_solve_linear_system() {
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let x = solve_linear_system(&a, &[5.0, 10.0]).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 3.0, epsilon = 1e-12);

        let singular = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        assert!(solve_linear_system(&singular, &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_invert_matrix() {
        let a = vec![vec![4.0, 7.0], vec![2.0, 6.0]];
        let inv = invert_matrix(&a).unwrap();
        assert_relative_eq!(inv[0][0], 0.6, epsilon = 1e-12);
        assert_relative_eq!(inv[0][1], -0.7, epsilon = 1e-12);
        assert_relative_eq!(inv[1][0], -0.2, epsilon = 1e-12);
        assert_relative_eq!(inv[1][1], 0.4, epsilon = 1e-12);
    }
}
