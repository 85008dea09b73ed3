use std::collections::HashSet;
use std::ops::Index;

use na::Vector3;
use rayon::prelude::*;

use crate::atoms::new::Atoms;
use crate::errors::{ElasticError, Result};

/// One entry of an atom's neighbour list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour {
    pub j: usize,
    /// Minimum image displacement from the central atom to `j`
    pub diff: Vector3<f64>,
    pub distance: f64,
}

impl Neighbour {
    pub fn new(j: usize, diff: Vector3<f64>) -> Self {
        Self {
            j,
            diff,
            distance: diff.norm(),
        }
    }
}

/// Ordered neighbours of every atom in a configuration.
#[derive(Debug, Clone, Default)]
pub struct NeighbourList {
    neighbours: Vec<Vec<Neighbour>>,
}

impl NeighbourList {
    pub fn new(neighbours: Vec<Vec<Neighbour>>) -> Self {
        Self { neighbours }
    }

    /// Builds a list from `(i, neighbour)` pairs, keeping the order in which they arrive.
    pub fn from_pairs<I>(n_atoms: usize, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, Neighbour)>,
    {
        let mut neighbours = vec![Vec::new(); n_atoms];
        for (i, neighbour) in pairs {
            for index in [i, neighbour.j] {
                if index >= n_atoms {
                    return Err(ElasticError::InvalidAtomIndex { index, n_atoms });
                }
            }
            neighbours[i].push(neighbour);
        }
        Ok(Self { neighbours })
    }

    pub fn n_atoms(&self) -> usize {
        self.neighbours.len()
    }

    pub fn of(&self, i: usize) -> &[Neighbour] {
        &self.neighbours[i]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[Neighbour]> {
        self.neighbours.iter().map(Vec::as_slice)
    }
}

impl Index<usize> for NeighbourList {
    type Output = [Neighbour];

    fn index(&self, i: usize) -> &Self::Output {
        &self.neighbours[i]
    }
}

/// Source of neighbour lists for a configuration.
pub trait NeighbourProvider: Send + Sync {
    fn neighbours(&self, atoms: &Atoms) -> Result<NeighbourList>;
}

/// Cell-linked-list neighbour search with a single cutoff.
#[derive(Debug, Clone, Copy)]
pub struct CellListNeighbours {
    pub cutoff: f64,
}

impl CellListNeighbours {
    pub fn new(cutoff: f64) -> Self {
        Self { cutoff }
    }
}

impl NeighbourProvider for CellListNeighbours {
    fn neighbours(&self, atoms: &Atoms) -> Result<NeighbourList> {
        if !(self.cutoff > 0.0) {
            return Err(ElasticError::InvalidArgument(format!(
                "neighbour cutoff must be positive, got {}",
                self.cutoff
            )));
        }

        let (nx, ny, nz) = atoms.divide_into_cells(self.cutoff);
        let (cells, atom_cells) = atoms.rcut_cells(nx, ny, nz);
        log::debug!(
            "Neighbour search over {}x{}x{} cells with cutoff {}",
            nx,
            ny,
            nz,
            self.cutoff
        );

        let neighbours: Vec<Vec<Neighbour>> = (0..atoms.n_atoms)
            .into_par_iter()
            .map(|i| {
                let (cx_i, cy_i, cz_i) = atom_cells[i];
                let r_i = atoms.positions.column(i);
                let mut visited: HashSet<usize> = HashSet::with_capacity(27);
                let mut found = Vec::new();

                for offset in NEIGHBOUR_OFFSETS.iter() {
                    let cx_j = match atoms.shift_cell(0, cx_i, offset.dx, nx) {
                        Some(c) => c,
                        None => continue,
                    };
                    let cy_j = match atoms.shift_cell(1, cy_i, offset.dy, ny) {
                        Some(c) => c,
                        None => continue,
                    };
                    let cz_j = match atoms.shift_cell(2, cz_i, offset.dz, nz) {
                        Some(c) => c,
                        None => continue,
                    };

                    let a_neighbour_cell = Atoms::cell_index(cx_j, cy_j, cz_j, nx, ny);
                    if !visited.insert(a_neighbour_cell) {
                        continue;
                    }

                    for &j in cells[a_neighbour_cell].iter() {
                        if j == i {
                            continue;
                        }
                        let rij = atoms.positions.column(j) - r_i;
                        let rij = atoms.sim_box.apply_boundary_conditions(&rij);
                        if rij.norm() <= self.cutoff {
                            found.push(Neighbour::new(j, rij));
                        }
                    }
                }

                found.sort_by_key(|n| n.j);
                found
            })
            .collect();

        Ok(NeighbourList::new(neighbours))
    }
}

impl Atoms {
    /// Bins atoms into the cell grid. Returns the atoms of each cell and the cell of each atom.
    pub fn rcut_cells(
        &self,
        nx: usize,
        ny: usize,
        nz: usize,
    ) -> (Vec<Vec<usize>>, Vec<(usize, usize, usize)>) {
        let ncell_total = nx * ny * nz;

        let approx_atoms_per_cell = self.n_atoms / ncell_total + 1;
        let mut cells: Vec<Vec<usize>> =
            vec![Vec::with_capacity(approx_atoms_per_cell); ncell_total];
        let mut atom_cells = Vec::with_capacity(self.n_atoms);

        for (i, r_i) in self.positions.column_iter().enumerate() {
            let s_i = self.sim_box.fractional(&r_i.into_owned());
            let cx_i = self.bin_coordinate(0, s_i[0], nx);
            let cy_i = self.bin_coordinate(1, s_i[1], ny);
            let cz_i = self.bin_coordinate(2, s_i[2], nz);

            let cell_index = Self::cell_index(cx_i, cy_i, cz_i, nx, ny);
            cells[cell_index].push(i);
            atom_cells.push((cx_i, cy_i, cz_i));
        }

        (cells, atom_cells)
    }

    /// Number of cells along each axis such that every cell is at least `rcut` wide.
    ///
    /// Each axis is capped at the cube root of the atom count, so a tiny cutoff gives
    /// wider cells instead of an empty grid that outnumbers the atoms.
    pub fn divide_into_cells(&self, rcut: f64) -> (usize, usize, usize) {
        let h = &self.sim_box.h;
        let volume = h.determinant().abs();
        let max_cells = (self.n_atoms as f64).cbrt().ceil().max(1.0) as usize;
        let mut ncell = [1usize; 3];

        for i in 0..3 {
            let a_j = h.column((i + 1) % 3);
            let a_k = h.column((i + 2) % 3);
            let width = volume / a_j.cross(&a_k).norm();
            if self.sim_box.pbc[i] && 2.0 * rcut > width {
                log::warn!(
                    "Cutoff {} exceeds half the cell width {} along axis {}; minimum image may miss neighbours",
                    rcut,
                    width,
                    i
                );
            }
            ncell[i] = ((width / rcut).floor() as usize).clamp(1, max_cells);
        }

        (ncell[0], ncell[1], ncell[2])
    }

    pub fn cell_index(cx: usize, cy: usize, cz: usize, nx: usize, ny: usize) -> usize {
        (cz * ny + cy) * nx + cx
    }

    fn bin_coordinate(&self, axis: usize, s: f64, n: usize) -> usize {
        let s = if self.sim_box.pbc[axis] { s - s.floor() } else { s };
        let c = (s * n as f64).floor();
        if c < 0.0 {
            0
        } else {
            (c as usize).min(n - 1)
        }
    }

    fn shift_cell(&self, axis: usize, c: usize, d: isize, n: usize) -> Option<usize> {
        let shifted = c as isize + d;
        if self.sim_box.pbc[axis] {
            Some(shifted.rem_euclid(n as isize) as usize)
        } else if shifted < 0 || shifted >= n as isize {
            None
        } else {
            Some(shifted as usize)
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Offset3 {
    pub dx: isize,
    pub dy: isize,
    pub dz: isize,
}

const fn offsets() -> [Offset3; 27] {
    let mut offsets = [Offset3 { dx: 0, dy: 0, dz: 0 }; 27];
    let mut n = 0;
    while n < 27 {
        offsets[n] = Offset3 {
            dx: (n % 3) as isize - 1,
            dy: ((n / 3) % 3) as isize - 1,
            dz: (n / 9) as isize - 1,
        };
        n += 1;
    }
    offsets
}

// full 27 cell stencil; each atom collects its own neighbours
pub const NEIGHBOUR_OFFSETS: [Offset3; 27] = offsets();

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::atoms::lattice::diamond_cubic;

    use super::*;

    #[test]
    fn diamond_atoms_have_four_nearest_neighbours() {
        let a = 5.43;
        let atoms = diamond_cubic(a, 3, 3, 3, 14).unwrap();
        let cutoff = 1.2 * a * 3f64.sqrt() / 4.0;
        let neighbours = CellListNeighbours::new(cutoff).neighbours(&atoms).unwrap();

        assert_eq!(neighbours.n_atoms(), atoms.n_atoms);
        for list in neighbours.iter() {
            assert_eq!(list.len(), 4);
            for n in list {
                assert_relative_eq!(n.distance, a * 3f64.sqrt() / 4.0, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn neighbours_are_sorted_by_index() {
        let atoms = diamond_cubic(5.43, 3, 3, 3, 14).unwrap();
        let neighbours = CellListNeighbours::new(2.8).neighbours(&atoms).unwrap();
        for list in neighbours.iter() {
            assert!(list.windows(2).all(|w| w[0].j < w[1].j));
        }
    }

    #[test]
    fn pairs_with_bad_index_are_rejected() {
        let pairs = vec![(0, Neighbour::new(3, Vector3::x()))];
        assert!(matches!(
            NeighbourList::from_pairs(2, pairs),
            Err(ElasticError::InvalidAtomIndex { index: 3, n_atoms: 2 })
        ));
    }

    #[test]
    fn non_positive_cutoff_is_rejected() {
        let atoms = diamond_cubic(5.43, 1, 1, 1, 14).unwrap();
        assert!(CellListNeighbours::new(0.0).neighbours(&atoms).is_err());
    }

    #[test]
    fn tiny_cutoff_keeps_the_cell_grid_bounded() {
        let atoms = diamond_cubic(5.43, 1, 1, 1, 14).unwrap();
        let (nx, ny, nz) = atoms.divide_into_cells(1e-5);
        // 8 atoms: about two cells per axis
        assert!([nx, ny, nz].iter().all(|&n| (1..=3).contains(&n)));

        let neighbours = CellListNeighbours::new(1e-3).neighbours(&atoms).unwrap();
        assert!(neighbours.iter().all(|list| list.is_empty()));
    }

    #[test]
    fn large_configuration_still_uses_cutoff_sized_cells() {
        let atoms = diamond_cubic(5.43, 3, 3, 3, 14).unwrap();
        // 16.29 wide; 216 atoms allow up to 6 cells per axis
        assert_eq!(atoms.divide_into_cells(2.8), (5, 5, 5));
    }
}
