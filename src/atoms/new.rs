use na::{Matrix3xX, Vector3};

use crate::errors::{ElasticError, Result};
use crate::simulation_box::SimulationBox;

#[derive(Debug, Clone)]
pub struct Atoms {
    pub n_atoms: usize,
    pub positions: Matrix3xX<f64>,
    /// Atomic number of each atom
    pub species: Vec<u32>,
    /// Type id as it appears in the data file
    pub type_ids: Vec<usize>,
    /// Site of the primitive cell each atom belongs to
    pub primitive_index: Option<Vec<usize>>,
    pub sim_box: SimulationBox,
}

impl Atoms {
    pub fn new_zeroes(n_atoms: usize) -> Self {
        Self {
            n_atoms,
            positions: Matrix3xX::zeros(n_atoms),
            species: vec![0; n_atoms],
            type_ids: vec![1; n_atoms],
            primitive_index: None,
            sim_box: SimulationBox::default(),
        }
    }

    pub fn from_positions(
        positions: Matrix3xX<f64>,
        species: Vec<u32>,
        sim_box: SimulationBox,
    ) -> Result<Self> {
        let n_atoms = positions.ncols();
        if species.len() != n_atoms {
            return Err(ElasticError::InvalidArgument(format!(
                "{} species given for {} atoms",
                species.len(),
                n_atoms
            )));
        }
        Ok(Self {
            n_atoms,
            positions,
            species,
            type_ids: vec![1; n_atoms],
            primitive_index: None,
            sim_box,
        })
    }

    pub fn with_primitive_index(mut self, primitive_index: Vec<usize>) -> Result<Self> {
        if primitive_index.len() != self.n_atoms {
            return Err(ElasticError::InvalidArgument(format!(
                "{} primitive indices given for {} atoms",
                primitive_index.len(),
                self.n_atoms
            )));
        }
        self.primitive_index = Some(primitive_index);
        Ok(self)
    }

    pub fn has_primitive_index(&self) -> bool {
        self.primitive_index.is_some()
    }

    pub fn position(&self, i: usize) -> Vector3<f64> {
        self.positions.column(i).into_owned()
    }

    pub fn distance_min_image(&self, i: usize, j: usize) -> f64 {
        self.sim_box
            .distance_min_image(&self.position(i), &self.position(j))
    }
}
