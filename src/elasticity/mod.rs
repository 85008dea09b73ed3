//! Strain and stress fields, Voigt algebra and elastic constant tensors.
pub mod atomic_strain;
pub mod fields;
pub mod frame;
pub mod moduli;
pub mod reference;
pub mod stress_field;
pub mod symmetry;
pub mod tensor;
pub mod voigt;

pub use fields::{
    interpolate_fields, AtomElasticState, ElasticFieldCalculator, ElasticFieldOptions,
    ElasticFields, LatticeSpec, StressState,
};
pub use frame::{CoordinationSystem, FrameGeometry};
pub use reference::{ReferenceEntry, ReferenceState};
pub use stress_field::AtomResolvedStressField;
pub use symmetry::{cubic, CrystalSymmetry};
pub use tensor::{
    elasticity_matrix_to_tensor, elasticity_tensor_to_matrix, transform_elasticity,
    transform_tensor, ElasticTensor,
};
pub use voigt::{strain_matrix, strain_vector, stress_matrix, stress_vector};
