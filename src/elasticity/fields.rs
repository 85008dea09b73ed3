//! Atom resolved strain and linear elastic stress fields.
//!
//! Each atom with the right coordination defines a local frame `E` from its neighbour
//! shell. The polar decomposition `E = S·R` splits it into a stretch `S` and a rotation
//! `R`. The strain is read off `S`, rotated into the crystal frame to apply the elastic
//! constants, and the resulting stress is rotated back into the sample frame.
use na::{Matrix3, Matrix6, Vector3, Vector6};
use rayon::prelude::*;

use crate::atoms::{Atoms, CellListNeighbours, NeighbourList, NeighbourProvider};
use crate::constants::{DEFAULT_CUTOFF_FACTOR, DIAMOND_BOND_TO_LATTICE};
use crate::elasticity::frame::{CoordinationSystem, FrameGeometry};
use crate::elasticity::reference::{ReferenceEntry, ReferenceState};
use crate::elasticity::voigt::{strain_vector, stress_matrix, stress_vector};
use crate::errors::{ElasticError, Result};
use crate::math::{polar_decomposition, sorted_eigen, symmetrize};

/// How the length scale of the ideal structure is given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LatticeSpec {
    LatticeConstant(f64),
    BondLength(f64),
}

impl LatticeSpec {
    /// Exactly one of the two must be given.
    pub fn resolve(lattice_constant: Option<f64>, bond_length: Option<f64>) -> Result<Self> {
        match (lattice_constant, bond_length) {
            (Some(a), None) => Ok(Self::LatticeConstant(a)),
            (None, Some(b)) => Ok(Self::BondLength(b)),
            _ => Err(ElasticError::InvalidArgument(
                "One of lattice constant or bond length must be given".to_string(),
            )),
        }
    }

    pub fn lattice_constant(&self) -> f64 {
        match *self {
            Self::LatticeConstant(a) => a,
            Self::BondLength(b) => b * DIAMOND_BOND_TO_LATTICE,
        }
    }

    pub fn bond_length(&self) -> f64 {
        match *self {
            Self::LatticeConstant(a) => a / DIAMOND_BOND_TO_LATTICE,
            Self::BondLength(b) => b,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ElasticFieldOptions {
    pub lattice: LatticeSpec,
    /// Second lattice constant, required by the anatase frame
    pub c: Option<f64>,
    pub c_vector: Option<Vector3<f64>>,
    pub cij: Option<Matrix6<f64>>,
    pub save_reference: bool,
    pub use_reference: bool,
    pub mask: Option<Vec<bool>>,
    pub interpolate: bool,
    pub interpolate_species: Option<u32>,
    pub cutoff_factor: f64,
    pub system: CoordinationSystem,
}

impl ElasticFieldOptions {
    pub fn new(lattice: LatticeSpec) -> Self {
        Self {
            lattice,
            c: None,
            c_vector: None,
            cij: None,
            save_reference: false,
            use_reference: false,
            mask: None,
            interpolate: false,
            interpolate_species: None,
            cutoff_factor: DEFAULT_CUTOFF_FACTOR,
            system: CoordinationSystem::Tetrahedral,
        }
    }

    pub fn with_cij(mut self, cij: Matrix6<f64>) -> Self {
        self.cij = Some(cij);
        self
    }

    pub fn with_system(mut self, system: CoordinationSystem) -> Self {
        self.system = system;
        self
    }

    pub fn geometry(&self) -> Result<FrameGeometry> {
        let a = self.lattice.lattice_constant();
        match self.system {
            CoordinationSystem::Tetrahedral => Ok(FrameGeometry::Tetrahedral { a }),
            CoordinationSystem::Anatase => {
                let c = self.c.ok_or_else(|| {
                    ElasticError::InvalidArgument(
                        "anatase frames need the lattice constant c".to_string(),
                    )
                })?;
                Ok(FrameGeometry::Anatase {
                    a,
                    c,
                    c_vector: self.c_vector.unwrap_or_else(|| Vector3::z()),
                })
            }
        }
    }
}

/// Stress of one atom with its derived quantities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressState {
    pub stress: Vector6<f64>,
    pub strain_energy_density: f64,
    /// Principal stresses in descending order
    pub eigenvalues: Vector3<f64>,
    pub eigenvectors: [Vector3<f64>; 3],
}

impl StressState {
    pub fn new(stress: Vector6<f64>, strain: &Vector6<f64>) -> Self {
        let (eigenvalues, eigenvectors) = sorted_eigen(&stress_matrix(&stress));
        Self {
            stress,
            strain_energy_density: 0.5 * strain.dot(&stress),
            eigenvalues,
            eigenvectors,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomElasticState {
    pub strain: Vector6<f64>,
    pub rotation: Matrix3<f64>,
    pub interpolated: bool,
    pub stress: Option<StressState>,
}

impl AtomElasticState {
    pub fn from_strain(strain: Vector6<f64>) -> Self {
        Self {
            strain,
            rotation: Matrix3::identity(),
            interpolated: false,
            stress: None,
        }
    }

    pub fn with_stress(mut self, stress: Vector6<f64>) -> Self {
        self.stress = Some(StressState::new(stress, &self.strain));
        self
    }
}

/// Per-atom results; `None` for atoms that were masked out or had no usable frame.
#[derive(Debug, Clone, Default)]
pub struct ElasticFields {
    states: Vec<Option<AtomElasticState>>,
}

impl ElasticFields {
    pub fn new(n_atoms: usize) -> Self {
        Self {
            states: vec![None; n_atoms],
        }
    }

    pub fn n_atoms(&self) -> usize {
        self.states.len()
    }

    pub fn get(&self, i: usize) -> Option<&AtomElasticState> {
        self.states.get(i).and_then(Option::as_ref)
    }

    pub fn set(&mut self, i: usize, state: AtomElasticState) -> Result<()> {
        let n_atoms = self.states.len();
        let slot = self
            .states
            .get_mut(i)
            .ok_or(ElasticError::InvalidAtomIndex { index: i, n_atoms })?;
        *slot = Some(state);
        Ok(())
    }

    pub fn strain(&self, i: usize) -> Option<&Vector6<f64>> {
        self.get(i).map(|state| &state.strain)
    }

    pub fn stress(&self, i: usize) -> Option<&StressState> {
        self.get(i).and_then(|state| state.stress.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&AtomElasticState>> {
        self.states.iter().map(Option::as_ref)
    }

    pub fn n_defined(&self) -> usize {
        self.states.iter().flatten().count()
    }

    pub fn n_interpolated(&self) -> usize {
        self.states.iter().flatten().filter(|s| s.interpolated).count()
    }

    /// Stress tensor of every atom, zero where undefined.
    pub fn stress_matrices(&self) -> Vec<Matrix3<f64>> {
        (0..self.n_atoms())
            .map(|i| match self.stress(i) {
                Some(state) => stress_matrix(&state.stress),
                None => Matrix3::zeros(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct LocalDeformation {
    stretch: Matrix3<f64>,
    stretch_inv: Matrix3<f64>,
    rotation: Matrix3<f64>,
}

/// Cyclic relabelling of the axes: x → z, y → x, z → y.
fn cyclic_permutation() -> Matrix3<f64> {
    #[rustfmt::skip]
    let p = Matrix3::new(
        0.0, 1.0, 0.0,
        0.0, 0.0, 1.0,
        1.0, 0.0, 0.0,
    );
    p
}

/// Picks the cubic axis assignment in which the local x axis is closest to the frame's first column.
fn canonical_rotation(rotation: Matrix3<f64>, e: &Matrix3<f64>) -> Matrix3<f64> {
    let rte = rotation.transpose() * e;
    let (x, y, z) = (rte[(0, 0)], rte[(1, 0)], rte[(2, 0)]);
    if y > x && y > z {
        cyclic_permutation() * rotation
    } else if z > x && z > y {
        cyclic_permutation().transpose() * rotation
    } else {
        rotation
    }
}

fn local_deformation(e: &Matrix3<f64>) -> Option<LocalDeformation> {
    let (stretch, rotation) = polar_decomposition(e)?;
    let stretch_inv = stretch.try_inverse()?;
    Some(LocalDeformation {
        stretch,
        stretch_inv,
        rotation: canonical_rotation(rotation, e),
    })
}

fn elastic_state(
    stretch: &Matrix3<f64>,
    rotation: &Matrix3<f64>,
    cij: Option<&Matrix6<f64>>,
) -> AtomElasticState {
    let identity = Matrix3::identity();
    let strain = strain_vector(&(stretch - identity));

    let stress = cij.map(|cij| {
        // strain in the crystal frame, where cij applies
        let crystal_strain = strain_vector(&(rotation.transpose() * stretch * rotation - identity));
        let sigma = stress_matrix(&(cij * crystal_strain));
        let sample_sigma = symmetrize(&(rotation * sigma * rotation.transpose()));
        StressState::new(stress_vector(&sample_sigma), &strain)
    });

    AtomElasticState {
        strain,
        rotation: *rotation,
        interpolated: false,
        stress,
    }
}

/// Sets each target atom to the mean of its neighbours' primary results.
///
/// Values are read from the fields as they are on entry, so targets never feed each other.
/// Returns the number of atoms that were filled in.
pub fn interpolate_fields(
    fields: &mut ElasticFields,
    neighbours: &NeighbourList,
    targets: &[usize],
) -> Result<usize> {
    let n_atoms = fields.n_atoms();
    if neighbours.n_atoms() != n_atoms {
        return Err(ElasticError::InvalidArgument(format!(
            "neighbour list covers {} atoms, fields hold {}",
            neighbours.n_atoms(),
            n_atoms
        )));
    }
    if let Some(&index) = targets.iter().find(|&&i| i >= n_atoms) {
        return Err(ElasticError::InvalidAtomIndex { index, n_atoms });
    }
    let primary = fields.clone();
    let mut filled = 0;

    for &i in targets {
        let sources: Vec<&AtomElasticState> = neighbours[i]
            .iter()
            .filter_map(|n| primary.get(n.j))
            .collect();
        if sources.is_empty() {
            continue;
        }
        let count = sources.len() as f64;

        let strain = sources.iter().map(|s| s.strain).sum::<Vector6<f64>>() / count;
        let mut state = AtomElasticState::from_strain(strain);
        state.interpolated = true;

        let stresses: Vec<Vector6<f64>> = sources
            .iter()
            .filter_map(|s| s.stress.map(|st| st.stress))
            .collect();
        if stresses.len() == sources.len() {
            let stress = stresses.iter().sum::<Vector6<f64>>() / count;
            state = state.with_stress(stress);
        }

        fields.set(i, state)?;
        filled += 1;
    }
    Ok(filled)
}

/// Computes elastic fields and owns the reference state shared across a trajectory.
#[derive(Debug, Clone)]
pub struct ElasticFieldCalculator {
    options: ElasticFieldOptions,
    reference: ReferenceState,
}

impl ElasticFieldCalculator {
    pub fn new(options: ElasticFieldOptions) -> Self {
        Self {
            options,
            reference: ReferenceState::new(),
        }
    }

    pub fn with_reference(options: ElasticFieldOptions, reference: ReferenceState) -> Self {
        Self { options, reference }
    }

    pub fn options(&self) -> &ElasticFieldOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ElasticFieldOptions {
        &mut self.options
    }

    pub fn reference(&self) -> &ReferenceState {
        &self.reference
    }

    pub fn into_reference(self) -> ReferenceState {
        self.reference
    }

    /// Nearest-neighbour cutoff: `cutoff_factor` times the ideal bond length.
    pub fn nearest_neighbour_cutoff(&self) -> f64 {
        self.options.cutoff_factor * self.options.lattice.bond_length()
    }

    pub fn compute_with<P: NeighbourProvider>(
        &mut self,
        atoms: &Atoms,
        provider: &P,
    ) -> Result<ElasticFields> {
        let neighbours = provider.neighbours(atoms)?;
        self.compute(atoms, &neighbours)
    }

    /// Builds nearest-neighbour connectivity with a cell list and computes the fields.
    pub fn compute_with_cell_list(&mut self, atoms: &Atoms) -> Result<ElasticFields> {
        let provider = CellListNeighbours::new(self.nearest_neighbour_cutoff());
        self.compute_with(atoms, &provider)
    }

    pub fn compute(&mut self, atoms: &Atoms, neighbours: &NeighbourList) -> Result<ElasticFields> {
        let n_atoms = atoms.n_atoms;
        if neighbours.n_atoms() != n_atoms {
            return Err(ElasticError::InvalidArgument(format!(
                "neighbour list covers {} atoms, configuration has {}",
                neighbours.n_atoms(),
                n_atoms
            )));
        }
        if let Some(index) = neighbours.iter().flatten().map(|n| n.j).find(|&j| j >= n_atoms) {
            return Err(ElasticError::InvalidAtomIndex { index, n_atoms });
        }
        if let Some(mask) = &self.options.mask {
            if mask.len() != n_atoms {
                return Err(ElasticError::MaskLength {
                    expected: n_atoms,
                    found: mask.len(),
                });
            }
        }
        let needs_sites = self.options.save_reference || self.options.use_reference;
        if needs_sites && !atoms.has_primitive_index() {
            return Err(ElasticError::MissingProperty("primitive_index"));
        }

        let geometry = self.options.geometry()?;
        let coordination = geometry.coordination();
        let mask = self.options.mask.as_deref();
        let selected = |i: usize| mask.map_or(true, |m| m[i]);

        let local: Vec<Option<LocalDeformation>> = (0..n_atoms)
            .into_par_iter()
            .map(|i| {
                if !selected(i) {
                    return None;
                }
                let e = geometry.frame(atoms, i, &neighbours[i])?;
                let deformation = local_deformation(&e);
                if deformation.is_none() {
                    log::debug!("Atom {} skipped: E·Eᵗ is not positive definite", i);
                }
                deformation
            })
            .collect();

        let n_candidates = (0..n_atoms)
            .filter(|&i| selected(i) && neighbours[i].len() == coordination)
            .count();

        // sequential so that the first atom of each site is the one saved
        let mut corrected: Vec<Option<(Matrix3<f64>, Matrix3<f64>)>> = Vec::with_capacity(n_atoms);
        for (i, deformation) in local.into_iter().enumerate() {
            let Some(deformation) = deformation else {
                corrected.push(None);
                continue;
            };
            let mut stretch = deformation.stretch;
            let mut rotation = deformation.rotation;

            if let Some(primitive_index) = atoms.primitive_index.as_ref().filter(|_| needs_sites) {
                let site = primitive_index[i];
                if self.options.save_reference {
                    self.reference.save(
                        site,
                        ReferenceEntry {
                            strain_inv: deformation.stretch_inv,
                            rotation_inv: deformation.rotation.transpose(),
                        },
                    );
                }
                if self.options.use_reference {
                    let entry = self.reference.get(site)?;
                    stretch *= entry.strain_inv;
                    rotation *= entry.rotation_inv;
                }
            }
            corrected.push(Some((stretch, rotation)));
        }

        let cij = self.options.cij.as_ref();
        let states: Vec<Option<AtomElasticState>> = corrected
            .into_par_iter()
            .map(|local| local.map(|(stretch, rotation)| elastic_state(&stretch, &rotation, cij)))
            .collect();
        let mut fields = ElasticFields { states };

        let n_primary = fields.n_defined();
        log::debug!(
            "{} of {} {}-fold coordinated atoms have a usable frame",
            n_primary,
            n_candidates,
            coordination
        );

        if self.options.interpolate {
            let targets: Vec<usize> = (0..n_atoms)
                .filter(|&i| {
                    selected(i)
                        && fields.get(i).is_none()
                        && !neighbours[i].is_empty()
                        && neighbours[i].len() != coordination
                        && self
                            .options
                            .interpolate_species
                            .map_or(true, |z| atoms.species[i] == z)
                })
                .collect();
            let filled = interpolate_fields(&mut fields, neighbours, &targets)?;
            log::debug!("Interpolated fields onto {} of {} atoms", filled, targets.len());
        }

        log::info!(
            "Elastic fields: {} primary, {} interpolated, {} undefined",
            n_primary,
            fields.n_interpolated(),
            n_atoms - fields.n_defined()
        );
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use crate::atoms::lattice::diamond_cubic;
    use crate::atoms::Neighbour;
    use crate::elasticity::symmetry::cubic;

    use super::*;

    #[test]
    fn lattice_spec_needs_exactly_one_length() {
        assert!(LatticeSpec::resolve(None, None).is_err());
        assert!(LatticeSpec::resolve(Some(5.43), Some(2.35)).is_err());

        let from_bond = LatticeSpec::resolve(None, Some(5.43 * 3f64.sqrt() / 4.0)).unwrap();
        assert_abs_diff_eq!(from_bond.lattice_constant(), 5.43, epsilon = 1e-12);
    }

    #[test]
    fn anatase_without_c_is_rejected() {
        let options = ElasticFieldOptions::new(LatticeSpec::LatticeConstant(3.78))
            .with_system(CoordinationSystem::Anatase);
        assert!(options.geometry().is_err());
    }

    #[test]
    fn interpolated_strain_is_neighbour_mean() {
        let mut fields = ElasticFields::new(3);
        fields.set(1, AtomElasticState::from_strain(Vector6::new(0.02, 0.0, 0.0, 0.0, 0.0, 0.0))).unwrap();
        fields.set(2, AtomElasticState::from_strain(Vector6::zeros())).unwrap();

        let neighbours = NeighbourList::new(vec![
            vec![Neighbour::new(1, Vector3::x()), Neighbour::new(2, -Vector3::x())],
            vec![Neighbour::new(0, -Vector3::x())],
            vec![Neighbour::new(0, Vector3::x())],
        ]);

        assert_eq!(interpolate_fields(&mut fields, &neighbours, &[0]).unwrap(), 1);
        let state = fields.get(0).unwrap();
        assert_abs_diff_eq!(state.strain, Vector6::new(0.01, 0.0, 0.0, 0.0, 0.0, 0.0), epsilon = 1e-15);
        assert!(state.interpolated);
        assert!(state.stress.is_none());
    }

    #[test]
    fn interpolation_averages_stress_and_recomputes_energy() {
        let c = cubic(165.7, 63.9, 79.6);
        let strain = Vector6::new(0.01, 0.0, 0.0, 0.0, 0.0, 0.0);
        let mut fields = ElasticFields::new(2);
        fields.set(1, AtomElasticState::from_strain(strain).with_stress(c * strain)).unwrap();

        let neighbours = NeighbourList::new(vec![vec![Neighbour::new(1, Vector3::x())], vec![]]);
        interpolate_fields(&mut fields, &neighbours, &[0]).unwrap();

        let stress = fields.stress(0).unwrap();
        assert_abs_diff_eq!(stress.stress, c * strain, epsilon = 1e-12);
        assert_abs_diff_eq!(stress.strain_energy_density, 0.5 * 165.7 * 1e-4, epsilon = 1e-12);
        assert_abs_diff_eq!(stress.eigenvalues[0], 1.657, epsilon = 1e-12);
    }

    #[test]
    fn target_without_defined_neighbours_stays_undefined() {
        let mut fields = ElasticFields::new(2);
        let neighbours = NeighbourList::new(vec![vec![Neighbour::new(1, Vector3::x())], vec![]]);
        assert_eq!(interpolate_fields(&mut fields, &neighbours, &[0]).unwrap(), 0);
        assert!(fields.get(0).is_none());
    }

    #[test]
    fn canonical_rotation_relabels_axes() {
        let identity = Matrix3::identity();
        let along_y = Matrix3::from_columns(&[Vector3::y(), Vector3::z(), Vector3::x()]);
        let along_z = Matrix3::from_columns(&[Vector3::z(), Vector3::x(), Vector3::y()]);

        assert_eq!(canonical_rotation(identity, &identity), identity);
        assert_eq!(canonical_rotation(identity, &along_y), cyclic_permutation());
        assert_eq!(canonical_rotation(identity, &along_z), cyclic_permutation().transpose());
    }

    #[test]
    fn mask_of_wrong_length_is_rejected() {
        let atoms = Atoms::new_zeroes(3);
        let neighbours = NeighbourList::new(vec![vec![]; 3]);
        let mut options = ElasticFieldOptions::new(LatticeSpec::LatticeConstant(5.43));
        options.mask = Some(vec![true; 2]);
        let mut calculator = ElasticFieldCalculator::new(options);
        assert!(matches!(
            calculator.compute(&atoms, &neighbours),
            Err(ElasticError::MaskLength { expected: 3, found: 2 })
        ));
    }

    #[test]
    fn out_of_range_interpolation_input_is_rejected() {
        let mut fields = ElasticFields::new(2);
        assert!(matches!(
            fields.set(2, AtomElasticState::from_strain(Vector6::zeros())),
            Err(ElasticError::InvalidAtomIndex { index: 2, n_atoms: 2 })
        ));

        let neighbours = NeighbourList::new(vec![vec![Neighbour::new(1, Vector3::x())], vec![]]);
        assert!(matches!(
            interpolate_fields(&mut fields, &neighbours, &[5]),
            Err(ElasticError::InvalidAtomIndex { index: 5, n_atoms: 2 })
        ));

        let short = NeighbourList::new(vec![vec![]]);
        assert!(interpolate_fields(&mut fields, &short, &[0]).is_err());
    }

    #[test]
    fn neighbour_outside_the_configuration_is_rejected() {
        let atoms = diamond_cubic(5.43, 1, 1, 1, 14).unwrap();
        let mut calculator =
            ElasticFieldCalculator::new(ElasticFieldOptions::new(LatticeSpec::LatticeConstant(5.43)));
        let provider = CellListNeighbours::new(calculator.nearest_neighbour_cutoff());
        let mut lists: Vec<Vec<Neighbour>> = provider
            .neighbours(&atoms)
            .unwrap()
            .iter()
            .map(<[Neighbour]>::to_vec)
            .collect();
        lists[0][0].j = 99;

        assert!(matches!(
            calculator.compute(&atoms, &NeighbourList::new(lists)),
            Err(ElasticError::InvalidAtomIndex { index: 99, n_atoms: 8 })
        ));
    }
}
