use na::{Matrix6, Vector3};

use crate::{
    constants::DEFAULT_CUTOFF_FACTOR,
    elasticity::{frame::CoordinationSystem, symmetry::CrystalSymmetry, ElasticFieldOptions},
};

pub struct ElasticConstantsArgs {
    pub cij: Matrix6<f64>,
    /// Symmetry class the constants are checked against before the run
    pub symmetry: Option<CrystalSymmetry>,
    pub line: usize,
}

/// Everything collected from the input command file.
pub struct AnalysisContext {
    /// Configurations to analyse, in file order
    pub frames: Vec<String>,
    pub reference: Option<String>,
    pub lattice_constant: Option<f64>,
    pub bond_length: Option<f64>,
    pub c: Option<f64>,
    pub c_vector: Option<Vector3<f64>>,
    pub system: CoordinationSystem,
    pub elastic_constants: Option<ElasticConstantsArgs>,
    pub cutoff_factor: f64,
    pub interpolate: bool,
    pub interpolate_species: Option<u32>,
    pub dump: Option<String>,
    /// Built by `System::contextualize`
    pub options: Option<ElasticFieldOptions>,
}

impl Default for AnalysisContext {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            reference: None,
            lattice_constant: None,
            bond_length: None,
            c: None,
            c_vector: None,
            system: CoordinationSystem::default(),
            elastic_constants: None,
            cutoff_factor: DEFAULT_CUTOFF_FACTOR,
            interpolate: true,
            interpolate_species: None,
            dump: None,
            options: None,
        }
    }
}
