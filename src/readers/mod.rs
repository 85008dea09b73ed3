//! Input command file and configuration readers.
pub mod analysis_context;
pub mod data_reader;
pub mod input_file;
