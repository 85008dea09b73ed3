use na::{Matrix3, Matrix6, Vector6};

use crate::atoms::{Atoms, CellListNeighbours, NeighbourProvider};
use crate::constants::DEFAULT_STRESS_CUTOFF;
use crate::elasticity::fields::{ElasticFieldCalculator, ElasticFieldOptions, LatticeSpec};
use crate::elasticity::voigt::stress_vector;
use crate::errors::{ElasticError, Result};
use crate::potentials::ElasticConstantsProvider;

/// Calculator interface giving local stresses from the atom resolved strain and linear elasticity.
#[derive(Debug, Clone)]
pub struct AtomResolvedStressField {
    calculator: ElasticFieldCalculator,
}

impl AtomResolvedStressField {
    pub fn new(a: f64, cij: Matrix6<f64>) -> Self {
        let options = ElasticFieldOptions::new(LatticeSpec::LatticeConstant(a)).with_cij(cij);
        Self {
            calculator: ElasticFieldCalculator::new(options),
        }
    }

    /// Takes the lattice constant from the first cell vector of a relaxed cubic unit cell and
    /// the elastic constants from its calculator.
    pub fn from_bulk(bulk: &Atoms, provider: &dyn ElasticConstantsProvider) -> Result<Self> {
        let a = bulk.sim_box.h[(0, 0)];
        let cij = provider.elastic_constants(bulk)?;
        log::debug!("Stress field from bulk: a = {}, C11 = {}", a, cij[(0, 0)]);
        Ok(Self::new(a, cij))
    }

    /// Full control over the field options, which must carry elastic constants.
    pub fn with_options(options: ElasticFieldOptions) -> Result<Self> {
        if options.cij.is_none() {
            return Err(ElasticError::InvalidArgument(
                "stress field needs elastic constants".to_string(),
            ));
        }
        Ok(Self {
            calculator: ElasticFieldCalculator::new(options),
        })
    }

    pub fn options_mut(&mut self) -> &mut ElasticFieldOptions {
        self.calculator.options_mut()
    }

    pub fn calculator(&self) -> &ElasticFieldCalculator {
        &self.calculator
    }

    /// Local stress of every atom as a symmetric 3×3 matrix; zero where no stress is defined.
    pub fn get_stresses(&mut self, atoms: &Atoms, cutoff: f64) -> Result<Vec<Matrix3<f64>>> {
        let neighbours = CellListNeighbours::new(cutoff).neighbours(atoms)?;
        let fields = self.calculator.compute(atoms, &neighbours)?;
        Ok(fields.stress_matrices())
    }

    /// Sum of the local stresses as a Voigt vector.
    pub fn get_stress(&mut self, atoms: &Atoms) -> Result<Vector6<f64>> {
        let total: Matrix3<f64> = self
            .get_stresses(atoms, DEFAULT_STRESS_CUTOFF)?
            .iter()
            .sum();
        Ok(stress_vector(&total))
    }
}
