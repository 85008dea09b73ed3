/// Frame entries below this magnitude are treated as exact zeros
pub const FRAME_ZERO_TOL: f64 = 1e-6;

/// Smallest eigenvalue of E·Eᵗ accepted by the polar decomposition
pub const DEGENERATE_EIGENVALUE: f64 = 1e-12;

/// Absolute tolerance of the minor/major symmetry check on rank-4 tensors
pub const TENSOR_SYMMETRY_TOL: f64 = 1e-10;

/// Cubic lattice constant over nearest-neighbour bond length in diamond: 4/√3
pub const DIAMOND_BOND_TO_LATTICE: f64 = 2.309_401_076_758_503;

pub const DEFAULT_CUTOFF_FACTOR: f64 = 1.2;

pub const DEFAULT_STRESS_CUTOFF: f64 = 3.0;

pub const GPA_TO_PA: f64 = 1e9;

pub const GCM3_TO_KGM3: f64 = 1e3;
