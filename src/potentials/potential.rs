use std::collections::HashMap;

use na::Matrix6;

use crate::atoms::Atoms;
use crate::errors::{ElasticError, Result};

/// Anything that can report the 6×6 elastic constants of a bulk configuration.
pub trait ElasticConstantsProvider: Send + Sync {
    fn elastic_constants(&self, bulk: &Atoms) -> Result<Matrix6<f64>>;
}

/// Returns the same constants whatever the configuration.
#[derive(Debug, Clone, Copy)]
pub struct FixedElasticConstants {
    pub cij: Matrix6<f64>,
}

impl FixedElasticConstants {
    pub fn new(cij: Matrix6<f64>) -> Self {
        Self { cij }
    }
}

impl ElasticConstantsProvider for FixedElasticConstants {
    fn elastic_constants(&self, _bulk: &Atoms) -> Result<Matrix6<f64>> {
        Ok(self.cij)
    }
}

pub type Table = HashMap<u32, Matrix6<f64>>;

/// Elastic constants looked up by the atomic number of a single-species bulk.
#[derive(Debug, Clone, Default)]
pub struct SpeciesElasticConstants {
    table: Table,
}

impl SpeciesElasticConstants {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, species: u32, cij: Matrix6<f64>) {
        self.table.insert(species, cij);
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl ElasticConstantsProvider for SpeciesElasticConstants {
    fn elastic_constants(&self, bulk: &Atoms) -> Result<Matrix6<f64>> {
        let species = match bulk.species.first() {
            Some(&z) => z,
            None => {
                return Err(ElasticError::InvalidArgument(
                    "bulk configuration has no atoms".to_string(),
                ))
            }
        };
        if bulk.species.iter().any(|&z| z != species) {
            return Err(ElasticError::InvalidArgument(
                "bulk configuration must contain a single species".to_string(),
            ));
        }
        self.table.get(&species).copied().ok_or_else(|| {
            ElasticError::InvalidArgument(format!("no elastic constants for species {species}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::atoms::lattice::diamond_cubic;
    use crate::elasticity::symmetry::cubic;

    use super::*;

    #[test]
    fn species_table_looks_up_bulk_species() {
        let silicon = cubic(165.7, 63.9, 79.6);
        let mut table = SpeciesElasticConstants::new();
        table.insert(14, silicon);

        let bulk = diamond_cubic(5.43, 1, 1, 1, 14).unwrap();
        assert_eq!(table.elastic_constants(&bulk).unwrap(), silicon);

        let carbon = diamond_cubic(3.57, 1, 1, 1, 6).unwrap();
        assert!(table.elastic_constants(&carbon).is_err());
    }

    #[test]
    fn mixed_bulk_is_rejected() {
        let mut table = SpeciesElasticConstants::new();
        table.insert(14, cubic(165.7, 63.9, 79.6));
        let mut bulk = diamond_cubic(5.43, 1, 1, 1, 14).unwrap();
        bulk.species[3] = 8;
        assert!(table.elastic_constants(&bulk).is_err());
    }
}
