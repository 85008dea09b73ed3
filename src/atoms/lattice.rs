use na::{Matrix3, Matrix3xX, Vector3};

use crate::atoms::new::Atoms;
use crate::errors::{ElasticError, Result};
use crate::simulation_box::SimulationBox;

/// Fractional coordinates of the eight sites of the conventional diamond cell.
pub fn diamond_basis_frac() -> Matrix3xX<f64> {
    let fcc = [
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(0.0, 0.5, 0.5),
        Vector3::new(0.5, 0.0, 0.5),
        Vector3::new(0.5, 0.5, 0.0),
    ];
    let shift = Vector3::new(0.25, 0.25, 0.25);

    let sites: Vec<Vector3<f64>> = fcc
        .iter()
        .copied()
        .chain(fcc.iter().map(|site| site + shift))
        .collect();
    Matrix3xX::from_columns(&sites)
}

/// Builds a periodic `nx × ny × nz` supercell of diamond-cubic with lattice constant `a`.
///
/// Each atom carries the index of its site in the conventional cell as its primitive index.
pub fn diamond_cubic(a: f64, nx: usize, ny: usize, nz: usize, species: u32) -> Result<Atoms> {
    if nx == 0 || ny == 0 || nz == 0 {
        return Err(ElasticError::InvalidArgument(format!(
            "supercell repeats must be positive, got {nx}x{ny}x{nz}"
        )));
    }

    let basis_frac = diamond_basis_frac();
    let n_atoms = nx * ny * nz * basis_frac.ncols();
    let mut positions = Matrix3xX::zeros(n_atoms);
    let mut primitive_index = Vec::with_capacity(n_atoms);

    let unit = Matrix3::identity() * a;
    let mut n = 0;
    for ix in 0..nx {
        for iy in 0..ny {
            for iz in 0..nz {
                let cell_origin_frac = Vector3::new(ix as f64, iy as f64, iz as f64);

                for (site, b) in basis_frac.column_iter().enumerate() {
                    let frac = cell_origin_frac + b;
                    positions.set_column(n, &(unit * frac));
                    primitive_index.push(site);
                    n += 1;
                }
            }
        }
    }

    let h = Matrix3::from_diagonal(&Vector3::new(
        nx as f64 * a,
        ny as f64 * a,
        nz as f64 * a,
    ));
    let sim_box = SimulationBox::new(h, [true; 3])?;

    Atoms::from_positions(positions, vec![species; n_atoms], sim_box)?
        .with_primitive_index(primitive_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supercell_has_eight_atoms_per_cell() {
        let atoms = diamond_cubic(5.43, 2, 3, 1, 14).unwrap();
        assert_eq!(atoms.n_atoms, 48);
        let primitive_index = atoms.primitive_index.as_ref().unwrap();
        assert_eq!(&primitive_index[..8], &[0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn empty_supercell_is_rejected() {
        assert!(diamond_cubic(5.43, 0, 1, 1, 14).is_err());
    }
}
