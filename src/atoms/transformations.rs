use na::Matrix3;

use crate::atoms::new::Atoms;
use crate::errors::Result;

impl Atoms {
    /// Applies a homogeneous deformation gradient to the cell and to every position.
    pub fn apply_deformation(&mut self, deformation: &Matrix3<f64>) -> Result<()> {
        let s = self.sim_box.h_inv * &self.positions;
        self.sim_box.set_cell(deformation * self.sim_box.h)?;
        self.sim_box.origin = deformation * self.sim_box.origin;
        self.positions = self.sim_box.h * s;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::atoms::lattice::diamond_cubic;

    use super::*;

    #[test]
    fn deformation_scales_bonds_and_cell() {
        let mut atoms = diamond_cubic(5.43, 2, 2, 2, 14).unwrap();
        let before = atoms.distance_min_image(0, 4);

        atoms.apply_deformation(&(Matrix3::identity() * 1.01)).unwrap();

        assert_relative_eq!(atoms.sim_box.h[(0, 0)], 2.0 * 5.43 * 1.01, epsilon = 1e-12);
        assert_relative_eq!(atoms.distance_min_image(0, 4), before * 1.01, epsilon = 1e-12);
    }
}
