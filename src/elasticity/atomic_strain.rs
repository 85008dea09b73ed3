use na::Matrix3;

use crate::atoms::{Atoms, NeighbourList};
use crate::errors::{ElasticError, Result};

/// Atomic strain of J. A. Zimmerman (PhD thesis, Stanford, 1999):
/// `Σ_n diff_i diff_j / r0²`, divided by `crystal_factor`.
pub fn atomic_strain(
    atoms: &Atoms,
    neighbours: &NeighbourList,
    r0: f64,
    crystal_factor: f64,
) -> Result<Vec<Matrix3<f64>>> {
    if neighbours.n_atoms() != atoms.n_atoms {
        return Err(ElasticError::InvalidArgument(format!(
            "neighbour list covers {} atoms, configuration has {}",
            neighbours.n_atoms(),
            atoms.n_atoms
        )));
    }
    if r0 == 0.0 || crystal_factor == 0.0 {
        return Err(ElasticError::InvalidArgument(
            "r0 and crystal_factor must be non-zero".to_string(),
        ));
    }

    let scale = 1.0 / (r0 * r0 * crystal_factor);
    Ok(neighbours
        .iter()
        .map(|list| {
            list.iter()
                .map(|n| n.diff * n.diff.transpose())
                .sum::<Matrix3<f64>>()
                * scale
        })
        .collect())
}
