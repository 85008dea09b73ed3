//! Sources of elastic constants for the stress field calculator.
pub mod potential;

pub use potential::{ElasticConstantsProvider, FixedElasticConstants, SpeciesElasticConstants};
