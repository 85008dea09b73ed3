//! Local deformation frames built from the neighbour shell of a single atom.
use std::fmt;
use std::str::FromStr;

use na::{Matrix3, Vector3};

use crate::atoms::{Atoms, Neighbour};
use crate::constants::FRAME_ZERO_TOL;
use crate::errors::{ElasticError, Result};
use crate::math::argsort;

/// Coordination environment whose deformation is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinationSystem {
    /// Four-fold coordinated atoms such as diamond or silica
    #[default]
    Tetrahedral,
    /// Six-fold coordinated Ti in anatase
    Anatase,
}

impl CoordinationSystem {
    pub fn coordination(&self) -> usize {
        match self {
            Self::Tetrahedral => 4,
            Self::Anatase => 6,
        }
    }
}

impl fmt::Display for CoordinationSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tetrahedral => f.write_str("tetrahedral"),
            Self::Anatase => f.write_str("anatase"),
        }
    }
}

impl FromStr for CoordinationSystem {
    type Err = ElasticError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tetrahedral" | "tetrahedric" => Ok(Self::Tetrahedral),
            "anatase" => Ok(Self::Anatase),
            other => Err(ElasticError::InvalidArgument(format!(
                "unknown coordination system '{other}'"
            ))),
        }
    }
}

/// Everything needed to turn a neighbour shell into a frame matrix `E`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameGeometry {
    Tetrahedral {
        a: f64,
    },
    Anatase {
        a: f64,
        c: f64,
        /// Direction of the longest O-O bond around each Ti
        c_vector: Vector3<f64>,
    },
}

impl FrameGeometry {
    pub fn system(&self) -> CoordinationSystem {
        match self {
            Self::Tetrahedral { .. } => CoordinationSystem::Tetrahedral,
            Self::Anatase { .. } => CoordinationSystem::Anatase,
        }
    }

    pub fn coordination(&self) -> usize {
        self.system().coordination()
    }

    /// Frame matrix of atom `i`, or `None` when the shell does not define one.
    pub fn frame(&self, atoms: &Atoms, i: usize, neighbours: &[Neighbour]) -> Option<Matrix3<f64>> {
        if neighbours.len() != self.coordination() {
            return None;
        }
        let order = canonical_order(atoms, neighbours);

        let e = match *self {
            Self::Tetrahedral { a } => tetrahedral_frame(neighbours, &order, a),
            Self::Anatase { a, c, c_vector } => {
                anatase_frame(atoms, neighbours, &order, a, c, &c_vector)
            }
        };

        let frame = clean_frame(e);
        if frame.is_none() {
            log::debug!("Atom {} has a degenerate {} frame", i, self.system());
        }
        frame
    }
}

/// Neighbour positions ordered by the primitive site of the neighbour, ties by list position.
pub fn canonical_order(atoms: &Atoms, neighbours: &[Neighbour]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..neighbours.len()).collect();
    if let Some(primitive_index) = &atoms.primitive_index {
        order.sort_by_key(|&k| (primitive_index[neighbours[k].j], k));
    }
    order
}

fn tetrahedral_frame(neighbours: &[Neighbour], order: &[usize], a: f64) -> Matrix3<f64> {
    let d = |k: usize| neighbours[order[k]].diff;

    // bond differences relative to the first neighbour span the cube faces
    let n1 = d(1) - d(0);
    let n2 = d(2) - d(0);
    let n3 = d(3) - d(0);

    Matrix3::from_columns(&[
        (n1 + n2 - n3) / a,
        (n2 + n3 - n1) / a,
        (n3 + n1 - n2) / a,
    ])
}

fn anatase_frame(
    atoms: &Atoms,
    neighbours: &[Neighbour],
    order: &[usize],
    a: f64,
    c: f64,
    c_vector: &Vector3<f64>,
) -> Matrix3<f64> {
    let c_local = c_vector * (c / 2.0);

    let dd: Vec<f64> = order
        .iter()
        .map(|&k| (c_local - neighbours[k].diff).norm())
        .collect();
    // positions in the ordered shell, used directly as indices into the raw list
    let mut ind = argsort(&dd);

    let apex = neighbours[ind[1]].j;
    let dd2 = [
        atoms.distance_min_image(apex, neighbours[ind[2]].j),
        atoms.distance_min_image(apex, neighbours[ind[3]].j),
        atoms.distance_min_image(apex, neighbours[ind[4]].j),
    ];
    let farthest = argsort(&dd2)[2];
    if farthest == 1 {
        ind.swap(3, 2);
    } else if farthest == 2 {
        ind.swap(4, 2);
    }

    let d = |k: usize| neighbours[ind[k]].diff;
    let n1 = d(0) - d(5);
    let n2 = d(1) - d(2);
    let n3 = d(3) - d(4);

    Matrix3::from_columns(&[n3 / a, n2 / a, n1 / c])
}

/// Zeroes numerical noise, rejects frames with a vanishing axis and flips all-negative frames.
fn clean_frame(mut e: Matrix3<f64>) -> Option<Matrix3<f64>> {
    e.iter_mut()
        .filter(|x| x.abs() < FRAME_ZERO_TOL)
        .for_each(|x| *x = 0.0);

    if e.column_iter().any(|col| col.iter().all(|&x| x == 0.0)) {
        return None;
    }

    if e.iter().all(|&x| x < 0.0) {
        e = -e;
    }
    Some(e)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use na::Matrix3xX;

    use crate::atoms::lattice::diamond_cubic;
    use crate::atoms::{CellListNeighbours, NeighbourProvider};
    use crate::simulation_box::SimulationBox;

    use super::*;

    #[test]
    fn perfect_tetrahedron_gives_orthogonal_frame() {
        let a = 5.43;
        let atoms = diamond_cubic(a, 3, 3, 3, 14).unwrap();
        let neighbours = CellListNeighbours::new(2.8).neighbours(&atoms).unwrap();
        let geometry = FrameGeometry::Tetrahedral { a };

        for i in [0, 5, 37] {
            let e = geometry.frame(&atoms, i, &neighbours[i]).unwrap();
            assert_abs_diff_eq!(e * e.transpose(), Matrix3::identity(), epsilon = 1e-12);
        }
    }

    #[test]
    fn wrong_coordination_gives_no_frame() {
        let atoms = diamond_cubic(5.43, 3, 3, 3, 14).unwrap();
        let neighbours = CellListNeighbours::new(2.8).neighbours(&atoms).unwrap();
        let geometry = FrameGeometry::Tetrahedral { a: 5.43 };
        assert!(geometry.frame(&atoms, 0, &neighbours[0][..3]).is_none());
    }

    #[test]
    fn coincident_neighbours_give_no_frame() {
        let atoms = Atoms::new_zeroes(5);
        let shell: Vec<Neighbour> = (1..5)
            .map(|j| Neighbour::new(j, Vector3::new(1.0, 1.0, 1.0)))
            .collect();
        let geometry = FrameGeometry::Tetrahedral { a: 5.43 };
        assert!(geometry.frame(&atoms, 0, &shell).is_none());
    }

    #[test]
    fn all_negative_frame_is_flipped() {
        let e = Matrix3::from_element(-0.5) - Matrix3::identity() * 0.1;
        let cleaned = clean_frame(e).unwrap();
        assert!(cleaned.iter().all(|&x| x > 0.0));
    }

    #[test]
    fn canonical_order_follows_primitive_index() {
        let atoms = Atoms::new_zeroes(4)
            .with_primitive_index(vec![0, 3, 1, 2])
            .unwrap();
        let shell: Vec<Neighbour> = (1..4).map(|j| Neighbour::new(j, Vector3::x())).collect();
        // neighbour j=1 has site 3, j=2 site 1, j=3 site 2
        assert_eq!(canonical_order(&atoms, &shell), vec![1, 2, 0]);
    }

    #[test]
    fn system_names_parse() {
        assert_eq!("tetrahedric".parse::<CoordinationSystem>().unwrap(), CoordinationSystem::Tetrahedral);
        assert_eq!("anatase".parse::<CoordinationSystem>().unwrap(), CoordinationSystem::Anatase);
        assert!("octahedral".parse::<CoordinationSystem>().is_err());
    }

    const A: f64 = 3.78;
    const C: f64 = 9.5;

    fn anatase() -> FrameGeometry {
        FrameGeometry::Anatase {
            a: A,
            c: C,
            c_vector: Vector3::z(),
        }
    }

    /// Ti at the origin followed by its six O neighbours in the given order.
    fn octahedron(shell: &[Vector3<f64>]) -> (Atoms, Vec<Neighbour>) {
        let mut columns = vec![Vector3::zeros()];
        columns.extend_from_slice(shell);
        let sim_box = SimulationBox::new(Matrix3::identity() * 20.0, [true; 3]).unwrap();
        let mut species = vec![8; columns.len()];
        species[0] = 22;
        let atoms = Atoms::from_positions(Matrix3xX::from_columns(&columns), species, sim_box).unwrap();
        let neighbours = shell
            .iter()
            .enumerate()
            .map(|(k, &diff)| Neighbour::new(k + 1, diff))
            .collect();
        (atoms, neighbours)
    }

    fn px() -> Vector3<f64> {
        Vector3::new(A / 2.0, 0.0, 0.0)
    }

    fn py() -> Vector3<f64> {
        Vector3::new(0.0, A / 2.0, 0.0)
    }

    fn pz() -> Vector3<f64> {
        Vector3::new(0.0, 0.0, C / 4.0)
    }

    #[test]
    fn ideal_octahedron_frame() {
        // the opposite equatorial O is already last of the three candidates
        let (atoms, shell) = octahedron(&[px(), -px(), py(), -py(), pz(), -pz()]);
        let e = anatase().frame(&atoms, 0, &shell).unwrap();
        #[rustfmt::skip]
        let expected = Matrix3::new(
            0.0, 1.0, 0.0,
            1.0, 0.0, 0.0,
            0.0, 0.0, 0.5,
        );
        assert_abs_diff_eq!(e, expected, epsilon = 1e-12);
    }

    #[test]
    fn opposite_oxygen_second_swaps_the_middle_pair() {
        let (atoms, shell) = octahedron(&[px(), py(), -px(), -py(), pz(), -pz()]);
        let e = anatase().frame(&atoms, 0, &shell).unwrap();
        #[rustfmt::skip]
        let expected = Matrix3::new(
            0.0, 1.0, 0.0,
            1.0, 0.0, 0.0,
            0.0, 0.0, 0.5,
        );
        assert_abs_diff_eq!(e, expected, epsilon = 1e-12);
    }

    #[test]
    fn opposite_oxygen_third_swaps_the_outer_pair() {
        let (atoms, shell) = octahedron(&[px(), py(), -py(), -px(), pz(), -pz()]);
        let e = anatase().frame(&atoms, 0, &shell).unwrap();
        #[rustfmt::skip]
        let expected = Matrix3::new(
            0.0,  1.0, 0.0,
            -1.0, 0.0, 0.0,
            0.0,  0.0, 0.5,
        );
        assert_abs_diff_eq!(e, expected, epsilon = 1e-12);
    }

    #[test]
    fn ordered_positions_index_the_raw_shell() {
        let (atoms, shell) = octahedron(&[px(), -px(), py(), -py(), pz(), -pz()]);
        // sites swap each pair, so ordered and raw positions no longer coincide
        let atoms = atoms.with_primitive_index(vec![0, 1, 0, 3, 2, 5, 4]).unwrap();
        assert_eq!(canonical_order(&atoms, &shell), vec![1, 0, 3, 2, 5, 4]);

        let e = anatase().frame(&atoms, 0, &shell).unwrap();
        #[rustfmt::skip]
        let expected = Matrix3::new(
            0.0, 1.0, 0.0,
            1.0, 0.0, 0.0,
            0.0, 0.0, -0.5,
        );
        assert_abs_diff_eq!(e, expected, epsilon = 1e-12);
    }

    #[test]
    fn five_fold_titanium_gives_no_frame() {
        let (atoms, shell) = octahedron(&[px(), -px(), py(), -py(), pz()]);
        assert!(anatase().frame(&atoms, 0, &shell).is_none());
    }
}
