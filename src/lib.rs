//! Atom resolved strain and stress fields of tetrahedrally and octahedrally coordinated crystals.
extern crate nalgebra as na;

pub mod atoms;
pub mod constants;
pub mod elasticity;
pub mod errors;
pub mod extensions;
pub mod logger;
pub mod math;
pub mod potentials;
pub mod readers;
pub mod simulation_box;
pub mod system;
pub mod writers;
