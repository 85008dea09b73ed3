//! Conversions between 6 component Voigt vectors and symmetric 3×3 tensors.
//!
//! Components are ordered `[xx, yy, zz, yz, xz, xy]`. Strain vectors carry engineering
//! shear strains (twice the tensor off-diagonals); stress vectors carry the off-diagonals
//! as they are.
use na::{Matrix3, Vector6};

/// Voigt index to tensor index pair.
pub const VOIGT_MAP: [(usize, usize); 6] = [(0, 0), (1, 1), (2, 2), (1, 2), (2, 0), (0, 1)];

/// Symmetric small-strain tensor from a Voigt strain vector.
pub fn strain_matrix(strain_vector: &Vector6<f64>) -> Matrix3<f64> {
    let e = strain_vector;
    #[rustfmt::skip]
    let m = Matrix3::new(
        e[0],       0.5 * e[5], 0.5 * e[4],
        0.5 * e[5], e[1],       0.5 * e[3],
        0.5 * e[4], 0.5 * e[3], e[2],
    );
    m
}

/// Symmetric stress tensor from a Voigt stress vector.
pub fn stress_matrix(stress_vector: &Vector6<f64>) -> Matrix3<f64> {
    let s = stress_vector;
    #[rustfmt::skip]
    let m = Matrix3::new(
        s[0], s[5], s[4],
        s[5], s[1], s[3],
        s[4], s[3], s[2],
    );
    m
}

/// Voigt strain vector of a small-strain tensor.
pub fn strain_vector(strain_matrix: &Matrix3<f64>) -> Vector6<f64> {
    let e = strain_matrix;
    Vector6::new(
        e[(0, 0)],
        e[(1, 1)],
        e[(2, 2)],
        2.0 * e[(1, 2)],
        2.0 * e[(0, 2)],
        2.0 * e[(0, 1)],
    )
}

/// Voigt stress vector of a stress tensor.
pub fn stress_vector(stress_matrix: &Matrix3<f64>) -> Vector6<f64> {
    let s = stress_matrix;
    Vector6::new(
        s[(0, 0)],
        s[(1, 1)],
        s[(2, 2)],
        s[(1, 2)],
        s[(0, 2)],
        s[(0, 1)],
    )
}
