use std::ops::{Index, IndexMut};

use na::{Matrix3, Matrix6};

use crate::constants::TENSOR_SYMMETRY_TOL;
use crate::elasticity::voigt::VOIGT_MAP;
use crate::errors::{ElasticError, Result};

/// Full rank-4 elastic constant tensor `c_ijkl`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElasticTensor(pub [[[[f64; 3]; 3]; 3]; 3]);

impl ElasticTensor {
    pub fn zeros() -> Self {
        Self::default()
    }
}

impl Index<(usize, usize, usize, usize)> for ElasticTensor {
    type Output = f64;

    fn index(&self, (i, j, k, l): (usize, usize, usize, usize)) -> &f64 {
        &self.0[i][j][k][l]
    }
}

impl IndexMut<(usize, usize, usize, usize)> for ElasticTensor {
    fn index_mut(&mut self, (i, j, k, l): (usize, usize, usize, usize)) -> &mut f64 {
        &mut self.0[i][j][k][l]
    }
}

/// Expands a 6×6 Voigt matrix into the full tensor using
/// `c_ijkl = c_jikl = c_ijlk = c_klij`.
pub fn elasticity_matrix_to_tensor(c: &Matrix6<f64>) -> ElasticTensor {
    let mut t = ElasticTensor::zeros();
    for p in 0..6 {
        for q in 0..6 {
            let (i, j) = VOIGT_MAP[p];
            let (k, l) = VOIGT_MAP[q];
            let value = c[(p, q)];
            t[(i, j, k, l)] = value;
            t[(j, i, k, l)] = value;
            t[(i, j, l, k)] = value;
            t[(j, i, l, k)] = value;
            t[(k, l, i, j)] = value;
        }
    }
    t
}

/// Compresses a full tensor into Voigt form after checking its minor and major symmetries.
pub fn elasticity_tensor_to_matrix(t: &ElasticTensor) -> Result<Matrix6<f64>> {
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                for l in 0..3 {
                    let c = t[(i, j, k, l)];
                    for partner in [t[(j, i, k, l)], t[(i, j, l, k)], t[(j, i, l, k)], t[(k, l, i, j)]] {
                        let deviation = (c - partner).abs();
                        if !(deviation < TENSOR_SYMMETRY_TOL) {
                            return Err(ElasticError::TensorSymmetry {
                                i,
                                j,
                                k,
                                l,
                                deviation,
                            });
                        }
                    }
                }
            }
        }
    }

    let mut c = Matrix6::zeros();
    for p in 0..6 {
        for q in 0..6 {
            let (i, j) = VOIGT_MAP[p];
            let (k, l) = VOIGT_MAP[q];
            c[(p, q)] = t[(i, j, k, l)];
        }
    }
    Ok(c)
}

/// Rotates a rank-4 tensor: `c'_ijkl = Σ R_ip R_jq R_kr R_ls c_pqrs`.
pub fn transform_tensor(c: &ElasticTensor, r: &Matrix3<f64>) -> ElasticTensor {
    let mut cp = ElasticTensor::zeros();
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                for l in 0..3 {
                    let mut sum = 0.0;
                    for p in 0..3 {
                        for q in 0..3 {
                            for s in 0..3 {
                                for t in 0..3 {
                                    sum += r[(i, p)]
                                        * r[(j, q)]
                                        * r[(k, s)]
                                        * r[(l, t)]
                                        * c[(p, q, s, t)];
                                }
                            }
                        }
                    }
                    cp[(i, j, k, l)] = sum;
                }
            }
        }
    }
    cp
}

/// Rotates a 6×6 Voigt matrix by going through the full tensor.
pub fn transform_elasticity(c: &Matrix6<f64>, r: &Matrix3<f64>) -> Result<Matrix6<f64>> {
    let rotated = transform_tensor(&elasticity_matrix_to_tensor(c), r);
    elasticity_tensor_to_matrix(&rotated)
}
