//! The atomic configuration, its neighbour lists and the lattices used to build test structures.
pub mod lattice;
pub mod neighbour_list;
pub mod new;
pub mod transformations;

pub use neighbour_list::{CellListNeighbours, Neighbour, NeighbourList, NeighbourProvider};
pub use new::Atoms;
