use ndarray::{Array1, Array2, Axis};

use crate::data::error::AnalysisError;

// ---------------------------------------------------------------------------
// Simple trendline (one feature)
// ---------------------------------------------------------------------------

/// `y = slope * x + intercept` fitted by ordinary least squares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trendline {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Rows where both x and y were present.
    pub n: usize,
}

impl Trendline {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// OLS fit over pairwise-complete rows. `None` with fewer than two points or
/// when x does not vary.
pub fn trendline(x: &[Option<f64>], y: &[Option<f64>]) -> Option<Trendline> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let sxx: f64 = pairs.iter().map(|(a, _)| (a - mx).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = pairs.iter().map(|(a, b)| (a - mx) * (b - my)).sum();
    let slope = sxy / sxx;
    let intercept = my - slope * mx;

    let ss_tot: f64 = pairs.iter().map(|(_, b)| (b - my).powi(2)).sum();
    let ss_res: f64 = pairs
        .iter()
        .map(|(a, b)| (b - (slope * a + intercept)).powi(2))
        .sum();
    let r_squared = if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot };

    Some(Trendline {
        slope,
        intercept,
        r_squared,
        n: pairs.len(),
    })
}

// ---------------------------------------------------------------------------
// Normal-equation solvers
// ---------------------------------------------------------------------------

const JACOBI_MAX_SWEEPS: usize = 100;
/// Off-diagonal mass, relative to the whole matrix, treated as converged.
const JACOBI_TOLERANCE: f64 = 1e-24;

/// Eigenvalues below this fraction of the largest one count as zero.
const RANK_TOLERANCE: f64 = 1e-10;

/// Solve the symmetric positive-definite system `a x = b` by Cholesky.
/// `None` when `a` is not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    // A = L * L^T
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= RANK_TOLERANCE * a[[i, i]].abs() {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L * y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // L^T * x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }
    Some(x)
}

/// Gauss-Jordan elimination with partial pivoting on `[a | b]`.
fn gauss_jordan_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut aug = Array2::<f64>::zeros((n, n + 1));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = a[[i, j]];
        }
        aug[[i, n]] = b[i];
    }

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&r1, &r2| aug[[r1, col]].abs().total_cmp(&aug[[r2, col]].abs()))?;
        if aug[[pivot_row, col]].abs() < 1e-10 {
            return None;
        }
        if pivot_row != col {
            for j in 0..=n {
                aug.swap([col, j], [pivot_row, j]);
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
    Some(aug.column(n).to_owned())
}

/// Eigen-decomposition of a symmetric matrix by cyclic Jacobi rotations.
/// Returns the eigenvalues and the matching eigenvectors as columns.
fn symmetric_eigen(a: &Array2<f64>) -> Option<(Array1<f64>, Array2<f64>)> {
    let n = a.nrows();
    let mut m = a.clone();
    let mut v = Array2::<f64>::eye(n);
    let total: f64 = a.iter().map(|x| x * x).sum();

    for _ in 0..JACOBI_MAX_SWEEPS {
        let mut off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off += m[[p, q]].powi(2);
            }
        }
        if off <= JACOBI_TOLERANCE * total {
            return Some((m.diag().to_owned(), v));
        }

        for p in 0..n {
            for q in (p + 1)..n {
                if m[[p, q]] == 0.0 {
                    continue;
                }
                let theta = (m[[q, q]] - m[[p, p]]) / (2.0 * m[[p, q]]);
                let sign = if theta >= 0.0 { 1.0 } else { -1.0 };
                let t = sign / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                // M <- J^T M J, V <- V J
                for k in 0..n {
                    let (mkp, mkq) = (m[[k, p]], m[[k, q]]);
                    m[[k, p]] = c * mkp - s * mkq;
                    m[[k, q]] = s * mkp + c * mkq;
                }
                for k in 0..n {
                    let (mpk, mqk) = (m[[p, k]], m[[q, k]]);
                    m[[p, k]] = c * mpk - s * mqk;
                    m[[q, k]] = s * mpk + c * mqk;
                }
                m[[p, q]] = 0.0;
                m[[q, p]] = 0.0;
                for k in 0..n {
                    let (vkp, vkq) = (v[[k, p]], v[[k, q]]);
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }
    None
}

/// Minimum-norm solution of the symmetric system `a x = b` through the
/// pseudo-inverse. Directions with a (near) zero eigenvalue get no weight.
fn pseudo_inverse_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let (values, vectors) = symmetric_eigen(a)?;
    let largest = values.iter().fold(0.0_f64, |acc, l| acc.max(l.abs()));
    let cutoff = largest * RANK_TOLERANCE;

    let projected = vectors.t().dot(b);
    let scaled: Array1<f64> = projected
        .iter()
        .zip(values.iter())
        .map(|(p, &l)| if l > cutoff { p / l } else { 0.0 })
        .collect();
    Some(vectors.dot(&scaled))
}

/// Least squares via the normal equations `(X^T X) w = X^T y`. Rank-deficient
/// designs (constant or collinear columns, fewer rows than columns) fall back
/// to the minimum-norm solution.
fn solve_least_squares(x: &Array2<f64>, y: &Array1<f64>) -> Option<Array1<f64>> {
    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);
    cholesky_solve(&xtx, &xty)
        .or_else(|| gauss_jordan_solve(&xtx, &xty))
        .or_else(|| {
            log::debug!("normal equations are singular, using the pseudo-inverse");
            pseudo_inverse_solve(&xtx, &xty)
        })
        .filter(|w| w.iter().all(|c| c.is_finite()))
}

// ---------------------------------------------------------------------------
// Multiple linear regression
// ---------------------------------------------------------------------------

/// Ordinary least squares with an intercept. No regularisation.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression {
    pub coefficients: Array1<f64>,
    pub intercept: f64,
}

impl LinearRegression {
    /// Fit on `x` (samples × features) and `y`. Data are centred first so the
    /// intercept falls out of the means.
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>) -> Result<Self, AnalysisError> {
        if x.nrows() != y.len() || x.nrows() == 0 {
            return Err(AnalysisError::SingularMatrix);
        }
        let x_mean = x.mean_axis(Axis(0)).ok_or(AnalysisError::SingularMatrix)?;
        let y_mean = y.mean().ok_or(AnalysisError::SingularMatrix)?;

        let x_centered = x - &x_mean.view().insert_axis(Axis(0));
        let y_centered = y - y_mean;

        let coefficients =
            solve_least_squares(&x_centered, &y_centered).ok_or(AnalysisError::SingularMatrix)?;
        let intercept = y_mean - coefficients.dot(&x_mean);

        Ok(LinearRegression {
            coefficients,
            intercept,
        })
    }

    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        x.dot(&self.coefficients) + self.intercept
    }

    pub fn predict_one(&self, features: &[f64]) -> f64 {
        features
            .iter()
            .zip(self.coefficients.iter())
            .map(|(f, c)| f * c)
            .sum::<f64>()
            + self.intercept
    }

    /// Coefficient of determination on the given data.
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> f64 {
        let pred = self.predict(x);
        let y_mean = y.mean().unwrap_or(0.0);
        let ss_res: f64 = y.iter().zip(pred.iter()).map(|(a, b)| (a - b).powi(2)).sum();
        let ss_tot: f64 = y.iter().map(|a| (a - y_mean).powi(2)).sum();
        if ss_tot == 0.0 {
            if ss_res == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - ss_res / ss_tot
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn trendline_recovers_exact_line() {
        let x = [Some(1.0), Some(2.0), None, Some(3.0)];
        let y = [Some(3.0), Some(5.0), Some(9.0), Some(7.0)];
        let t = trendline(&x, &y).unwrap();
        assert!((t.slope - 2.0).abs() < 1e-12);
        assert!((t.intercept - 1.0).abs() < 1e-12);
        assert!((t.r_squared - 1.0).abs() < 1e-12);
        assert_eq!(t.n, 3);
        assert!((t.at(10.0) - 21.0).abs() < 1e-12);
    }

    #[test]
    fn trendline_needs_varying_x() {
        assert!(trendline(&[Some(1.0), Some(1.0)], &[Some(1.0), Some(2.0)]).is_none());
        assert!(trendline(&[Some(1.0)], &[Some(1.0)]).is_none());
    }

    #[test]
    fn fits_two_feature_plane() {
        // y = 1 + 2a + 3b
        let x = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [2.0, 1.0]];
        let y = array![1.0, 3.0, 4.0, 6.0, 8.0];
        let model = LinearRegression::fit(&x, &y).unwrap();
        assert!((model.intercept - 1.0).abs() < 1e-9);
        assert!((model.coefficients[0] - 2.0).abs() < 1e-9);
        assert!((model.coefficients[1] - 3.0).abs() < 1e-9);
        assert!((model.predict_one(&[3.0, 2.0]) - 13.0).abs() < 1e-9);
        assert!((model.score(&x, &y) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn collinear_features_take_minimum_norm_weights() {
        let x = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0]];
        let y = array![1.0, 2.0, 3.0];
        let model = LinearRegression::fit(&x, &y).unwrap();
        // y = a = 0.2a + 0.4b with b = 2a
        assert!((model.coefficients[0] - 0.2).abs() < 1e-9);
        assert!((model.coefficients[1] - 0.4).abs() < 1e-9);
        assert!(model.intercept.abs() < 1e-9);
        assert!((model.predict_one(&[4.0, 8.0]) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn constant_feature_gets_zero_weight() {
        let x = array![[20.0, 100.0], [30.0, 100.0], [40.0, 100.0]];
        let y = array![40.0, 60.0, 80.0];
        let model = LinearRegression::fit(&x, &y).unwrap();
        assert!((model.coefficients[0] - 2.0).abs() < 1e-9);
        assert!(model.coefficients[1].abs() < 1e-9);
        assert!(model.intercept.abs() < 1e-9);
        assert!((model.score(&x, &y) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn more_features_than_rows_still_fits() {
        let x = array![[1.0, 5.0, 2.0], [3.0, 1.0, 4.0]];
        let y = array![10.0, 20.0];
        let model = LinearRegression::fit(&x, &y).unwrap();
        let fitted = model.predict(&x);
        assert!((fitted[0] - 10.0).abs() < 1e-9);
        assert!((fitted[1] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn eigen_reconstructs_symmetric_matrix() {
        let a = array![[4.0, 1.0, 2.0], [1.0, 3.0, 0.5], [2.0, 0.5, 5.0]];
        let (values, vectors) = symmetric_eigen(&a).unwrap();
        let rebuilt = vectors.dot(&Array2::from_diag(&values)).dot(&vectors.t());
        for (r, o) in rebuilt.iter().zip(a.iter()) {
            assert!((r - o).abs() < 1e-9);
        }
    }

    #[test]
    fn gauss_jordan_handles_pivoting() {
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let b = array![2.0, 3.0];
        let x = gauss_jordan_solve(&a, &b).unwrap();
        assert_eq!(x, array![3.0, 2.0]);
    }
}
