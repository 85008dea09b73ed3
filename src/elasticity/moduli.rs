//! Engineering quantities derived from a matrix of elastic constants.
use na::{Matrix6, Vector3};

use crate::constants::{GCM3_TO_KGM3, GPA_TO_PA};
use crate::elasticity::tensor::{elasticity_matrix_to_tensor, ElasticTensor};
use crate::errors::{ElasticError, Result};
use crate::math::bisect;

/// Compliance tensor `s_ijkl` of a Voigt stiffness matrix.
pub fn compliance_tensor(cij: &Matrix6<f64>) -> Result<ElasticTensor> {
    let mut s = cij
        .try_inverse()
        .ok_or(ElasticError::SingularElasticConstants)?;

    // Voigt compliances carry factors of 2 on shear indices
    for p in 0..6 {
        for q in 0..6 {
            let shear_indices = (p >= 3) as i32 + (q >= 3) as i32;
            s[(p, q)] *= 0.5f64.powi(shear_indices);
        }
    }
    Ok(elasticity_matrix_to_tensor(&s))
}

fn unit(direction: &Vector3<f64>) -> Result<Vector3<f64>> {
    direction.try_normalize(f64::EPSILON).ok_or_else(|| {
        ElasticError::InvalidArgument("direction must be a non-zero vector".to_string())
    })
}

/// `Σ a_i a_j b_k b_l s_ijkl`
fn contract(s: &ElasticTensor, a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let mut sum = 0.0;
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                for l in 0..3 {
                    sum += a[i] * a[j] * b[k] * b[l] * s[(i, j, k, l)];
                }
            }
        }
    }
    sum
}

/// Young's modulus along `direction`, in the units of `cij`.
pub fn youngs_modulus(cij: &Matrix6<f64>, direction: &Vector3<f64>) -> Result<f64> {
    let s = compliance_tensor(cij)?;
    let l = unit(direction)?;
    Ok(1.0 / contract(&s, &l, &l))
}

/// Poisson ratio for a load along `axial` and contraction along `lateral`.
pub fn poisson_ratio(
    cij: &Matrix6<f64>,
    axial: &Vector3<f64>,
    lateral: &Vector3<f64>,
) -> Result<f64> {
    let s = compliance_tensor(cij)?;
    let l = unit(axial)?;
    let m = unit(lateral)?;
    Ok(-contract(&s, &m, &l) / contract(&s, &l, &l))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveSpeeds {
    /// Transverse wave speed, m/s
    pub vs: f64,
    /// Longitudinal wave speed, m/s
    pub vp: f64,
    /// Rayleigh surface wave speed along x, m/s
    pub c_r: f64,
}

/// Rayleigh wave speed of a crystal whose constants `cij` (GPa) are expressed in the sample frame.
///
/// The anisotropic secular function follows Darinskii, Wave Motion 25, 35 (1997); `rho`
/// is the density in g/cm³.
pub fn rayleigh_wave_speed(cij: &Matrix6<f64>, rho: f64, isotropic: bool) -> Result<WaveSpeeds> {
    if !(rho > 0.0) {
        return Err(ElasticError::InvalidArgument(format!(
            "density must be positive, got {rho}"
        )));
    }
    let c = cij * GPA_TO_PA;
    let rho = rho * GCM3_TO_KGM3;

    let vs = (c[(3, 3)] / rho).sqrt();
    let (vp, c_r) = if isotropic {
        let vp = (c[(0, 0)] / rho).sqrt();
        let f = |v: f64| {
            (1.0 - (v / vs).powi(2)).sqrt() * (1.0 - (v / vp).powi(2)).sqrt()
                - (1.0 - v.powi(2) / (2.0 * vs.powi(2))).powi(2)
        };
        (vp, bisect(f, vs / 2.0, vs, 2e-12)?)
    } else {
        let vp = (c[(2, 2)] / rho).sqrt();
        let f = |x: f64| {
            let xp2 = (x / vp).powi(2);
            xp2.powi(2) * ((c[(2, 2)] / c[(1, 1)]) * (1.0 - xp2))
                - (1.0 - c[(2, 1)].powi(2) / (c[(1, 1)] * c[(2, 2)]) - xp2).powi(2)
                    * (1.0 - (x / vs).powi(2))
        };
        (vp, bisect(f, vs / 2.0, vs, 2e-12)?)
    };

    Ok(WaveSpeeds { vs, vp, c_r })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::elasticity::symmetry::cubic;

    use super::*;

    const SILICON: (f64, f64, f64) = (165.7, 63.9, 79.6);

    #[test]
    fn cubic_youngs_modulus_along_100() {
        let (c11, c12, c44) = SILICON;
        let e = youngs_modulus(&cubic(c11, c12, c44), &Vector3::x()).unwrap();
        assert_relative_eq!(e, (c11 - c12) * (c11 + 2.0 * c12) / (c11 + c12), max_relative = 1e-10);
    }

    #[test]
    fn cubic_poisson_ratio_in_100_plane() {
        let (c11, c12, c44) = SILICON;
        let nu = poisson_ratio(&cubic(c11, c12, c44), &Vector3::x(), &Vector3::y()).unwrap();
        assert_relative_eq!(nu, c12 / (c11 + c12), max_relative = 1e-10);
    }

    #[test]
    fn isotropic_youngs_modulus_is_direction_independent() {
        let mu = 30.0;
        let c = cubic(3.0 * mu, mu, mu);
        let e_x = youngs_modulus(&c, &Vector3::x()).unwrap();
        let e_111 = youngs_modulus(&c, &Vector3::new(1.0, 1.0, 1.0)).unwrap();
        assert_relative_eq!(e_x, 2.5 * mu, max_relative = 1e-10);
        assert_relative_eq!(e_111, e_x, max_relative = 1e-10);
    }

    #[test]
    fn zero_direction_is_rejected() {
        let (c11, c12, c44) = SILICON;
        assert!(youngs_modulus(&cubic(c11, c12, c44), &Vector3::zeros()).is_err());
        assert!(matches!(
            youngs_modulus(&Matrix6::zeros(), &Vector3::x()),
            Err(ElasticError::SingularElasticConstants)
        ));
    }

    #[test]
    fn isotropic_rayleigh_speed_for_quarter_poisson_ratio() {
        let mu = 30.0;
        let speeds = rayleigh_wave_speed(&cubic(3.0 * mu, mu, mu), 2.7, true).unwrap();

        assert_relative_eq!(speeds.vs, (30e9f64 / 2700.0).sqrt(), max_relative = 1e-12);
        assert_relative_eq!(speeds.vp, 3f64.sqrt() * speeds.vs, max_relative = 1e-12);
        let expected = (2.0 - 2.0 / 3f64.sqrt()).sqrt() * speeds.vs;
        assert_relative_eq!(speeds.c_r, expected, max_relative = 1e-8);
    }

    #[test]
    fn anisotropic_rayleigh_speed_is_below_shear_speed() {
        let (c11, c12, c44) = SILICON;
        let speeds = rayleigh_wave_speed(&cubic(c11, c12, c44), 2.33, false).unwrap();
        assert!(speeds.c_r > 0.5 * speeds.vs && speeds.c_r < speeds.vs);
        assert!(speeds.vp > speeds.vs);
    }
}
