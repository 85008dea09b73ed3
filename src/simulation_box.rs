use na::{Matrix3, Vector3};

use crate::errors::{ElasticError, Result};

/// Periodic cell. The columns of `h` are the cell vectors.
#[derive(Debug, Clone)]
pub struct SimulationBox {
    pub h: Matrix3<f64>,
    pub h_inv: Matrix3<f64>,
    pub pbc: [bool; 3],
    pub origin: Vector3<f64>,
}

impl SimulationBox {
    pub fn new(h: Matrix3<f64>, pbc: [bool; 3]) -> Result<Self> {
        let h_inv = h.try_inverse().ok_or(ElasticError::SingularCell)?;
        Ok(Self {
            h,
            h_inv,
            pbc,
            origin: Vector3::zeros(),
        })
    }

    /// Builds the cell from LAMMPS style bounds and tilt factors.
    pub fn from_lammps_data(
        xlo: f64,
        xhi: f64,
        ylo: f64,
        yhi: f64,
        zlo: f64,
        zhi: f64,
        xy: f64,
        xz: f64,
        yz: f64,
    ) -> Result<Self> {
        #[rustfmt::skip]
        let h = Matrix3::new(
            xhi - xlo, xy,        xz,
            0.0,       yhi - ylo, yz,
            0.0,       0.0,       zhi - zlo,
        );
        let mut sim_box = Self::new(h, [true; 3])?;
        sim_box.origin = Vector3::new(xlo, ylo, zlo);
        Ok(sim_box)
    }

    pub fn default() -> Self {
        Self {
            h: Matrix3::identity(),
            h_inv: Matrix3::identity(),
            pbc: [true; 3],
            origin: Vector3::zeros(),
        }
    }

    pub fn set_cell(&mut self, h: Matrix3<f64>) -> Result<()> {
        self.h_inv = h.try_inverse().ok_or(ElasticError::SingularCell)?;
        self.h = h;
        Ok(())
    }

    /// Minimum image of a separation vector.
    pub fn apply_boundary_conditions(&self, rij: &Vector3<f64>) -> Vector3<f64> {
        let mut s = self.h_inv * rij;

        for i in 0..3 {
            if self.pbc[i] {
                s[i] -= s[i].round();
            }
        }

        self.h * s
    }

    /// Fractional coordinates of a position relative to the box origin.
    pub fn fractional(&self, r: &Vector3<f64>) -> Vector3<f64> {
        self.h_inv * (r - self.origin)
    }

    pub fn distance_min_image(&self, ri: &Vector3<f64>, rj: &Vector3<f64>) -> f64 {
        self.apply_boundary_conditions(&(rj - ri)).norm()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn minimum_image_wraps_across_the_cell() {
        let sim_box = SimulationBox::from_lammps_data(0.0, 10.0, 0.0, 10.0, 0.0, 10.0, 0.0, 0.0, 0.0).unwrap();
        let d = sim_box.distance_min_image(&Vector3::new(0.5, 0.0, 0.0), &Vector3::new(9.5, 0.0, 0.0));
        assert_relative_eq!(d, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn open_axis_does_not_wrap() {
        let sim_box = SimulationBox::new(Matrix3::identity() * 10.0, [true, true, false]).unwrap();
        let rij = sim_box.apply_boundary_conditions(&Vector3::new(0.0, 0.0, 9.0));
        assert_relative_eq!(rij.z, 9.0, epsilon = 1e-12);
    }

    #[test]
    fn singular_cell_is_rejected() {
        assert!(matches!(
            SimulationBox::new(Matrix3::zeros(), [true; 3]),
            Err(ElasticError::SingularCell)
        ));
    }
}
