//! Dense linear solves for the attribution regression

use ndarray::{Array1, Array2};

/// Pivots below this are treated as singular
const PIVOT_EPS: f64 = 1e-12;

/// Solve `a x = b` by Gaussian elimination with partial pivoting
///
/// Returns `None` if `a` is singular to working precision.
pub fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
    let n = b.len();
    debug_assert_eq!(a.dim(), (n, n));

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))?;
        if a[[pivot, col]].abs() < PIVOT_EPS {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }

        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Some(x)
}

/// Solve the normal equations of weighted least squares,
/// `(Xᵀ W X) β = Xᵀ W y`, with a small ridge if they are singular
pub fn weighted_least_squares(x: &Array2<f64>, y: &Array1<f64>, weights: &Array1<f64>) -> Array1<f64> {
    let xtw = &x.t() * weights;
    let xtwx = xtw.dot(x);
    let xtwy = xtw.dot(y);

    if let Some(beta) = solve(xtwx.clone(), xtwy.clone()) {
        return beta;
    }

    let scale = (0..xtwx.nrows()).map(|i| xtwx[[i, i]]).sum::<f64>().max(1.0);
    let ridge = Array2::<f64>::eye(xtwx.nrows()) * (scale * 1e-8);
    solve(xtwx + ridge, xtwy.clone()).unwrap_or_else(|| Array1::zeros(xtwy.len()))
}
