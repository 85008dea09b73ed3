//! Output of configurations and per-atom fields.
pub mod data_file;
pub mod dump_traj;
