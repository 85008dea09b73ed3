use na::{Matrix3, SymmetricEigen, Vector3};

use crate::constants::DEGENERATE_EIGENVALUE;
use crate::errors::{ElasticError, Result};

pub trait ApproxEqual {
    type Epsilon: Copy;
    fn approx_eq(&self, other: Self, eps: Self::Epsilon) -> bool;
    fn default_epsilon() -> Self::Epsilon;
}

impl ApproxEqual for f64 {
    type Epsilon = f64;

    fn approx_eq(&self, other: Self, eps: Self::Epsilon) -> bool {
        (self - other).abs() < eps
    }

    fn default_epsilon() -> Self::Epsilon {
        1e-8
    }
}

pub fn symmetrize(a_matrix: &Matrix3<f64>) -> Matrix3<f64> {
    (a_matrix + a_matrix.transpose()) * 0.5
}

/// Polar decomposition `E = S·R` with `S` symmetric positive definite and `R` orthogonal.
///
/// Goes through the eigendecomposition `E·Eᵗ = V·D·Vᵗ`, so that `S = V·D^½·Vᵗ` and
/// `R = V·D^-½·Vᵗ·E`. Returns `None` when `E·Eᵗ` is not positive definite.
pub fn polar_decomposition(e: &Matrix3<f64>) -> Option<(Matrix3<f64>, Matrix3<f64>)> {
    let eet = symmetrize(&(e * e.transpose()));
    let eigen = SymmetricEigen::new(eet);

    if eigen
        .eigenvalues
        .iter()
        .any(|&d| !d.is_finite() || d <= DEGENERATE_EIGENVALUE)
    {
        return None;
    }

    let v = eigen.eigenvectors;
    let sqrt_d = Matrix3::from_diagonal(&eigen.eigenvalues.map(f64::sqrt));
    let inv_sqrt_d = Matrix3::from_diagonal(&eigen.eigenvalues.map(|d| 1.0 / d.sqrt()));

    let s = v * sqrt_d * v.transpose();
    let r = v * inv_sqrt_d * v.transpose() * e;
    Some((s, r))
}

/// Eigenpairs of a symmetric matrix, ordered by descending eigenvalue.
pub fn sorted_eigen(m: &Matrix3<f64>) -> (Vector3<f64>, [Vector3<f64>; 3]) {
    let eigen = SymmetricEigen::new(*m);
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    let values = Vector3::new(
        eigen.eigenvalues[order[0]],
        eigen.eigenvalues[order[1]],
        eigen.eigenvalues[order[2]],
    );
    let vectors = order.map(|k| eigen.eigenvectors.column(k).into_owned());
    (values, vectors)
}

/// Stable argsort of a slice of floats.
pub fn argsort(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    order
}

/// Root of `f` in `[lower, upper]` by bisection.
pub fn bisect<F: Fn(f64) -> f64>(f: F, lower: f64, upper: f64, xtol: f64) -> Result<f64> {
    let (mut a, mut b) = (lower, upper);
    let (mut fa, fb) = (f(a), f(b));

    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }
    if fa.signum() == fb.signum() {
        return Err(ElasticError::NoRoot { lower, upper });
    }

    for _ in 0..200 {
        let mid = 0.5 * (a + b);
        let fm = f(mid);
        if fm == 0.0 || (b - a).abs() < xtol {
            return Ok(mid);
        }
        if fm.signum() == fa.signum() {
            a = mid;
            fa = fm;
        } else {
            b = mid;
        }
    }
    Ok(0.5 * (a + b))
}
