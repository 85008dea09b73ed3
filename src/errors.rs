use thiserror::Error;

#[derive(Error, Debug)]
pub enum ElasticError {
    // File I/O Errors
    #[error("Failed to open input file '{path}': {source}")]
    InputFileError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read line {line} in file '{path}': {source}")]
    DataFileError {
        path: String,
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output file '{path}': {source}")]
    OutputFileError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // Parsing Errors
    #[error("Invalid command {command} found line: {line}")]
    UnknownCommand { command: String, line: usize },

    #[error("Missing argument on line {line}")]
    MissingArgument { line: usize },

    #[error("Error parsing floating number from string {string}: {source}")]
    FloatParseError {
        string: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("Error parsing integer number from string {string}: {source}")]
    IntParseError {
        string: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("Malformed data file '{path}' at line {line}: {reason}")]
    MalformedData {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Invalid argument: {string} at line: {line}")]
    InvalidCommandArgument { string: String, line: usize },

    // Configuration errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No configurations given - missing read_data command")]
    NoFramesDefined,

    #[error("Property \"{0}\" missing from atoms")]
    MissingProperty(&'static str),

    #[error("No reference state stored for primitive site {site}")]
    MissingReference { site: usize },

    #[error("Mask length {found} does not match atom count {expected}")]
    MaskLength { expected: usize, found: usize },

    #[error("Cell matrix is singular")]
    SingularCell,

    // Elasticity errors
    #[error(
        "Elastic tensor breaks symmetry at ({i}, {j}, {k}, {l}): deviation {deviation:e}"
    )]
    TensorSymmetry {
        i: usize,
        j: usize,
        k: usize,
        l: usize,
        deviation: f64,
    },

    #[error("Elastic constant C{row}{col} breaks the {symmetry} pattern")]
    SymmetryPattern {
        symmetry: String,
        row: usize,
        col: usize,
    },

    #[error("Unknown crystal symmetry '{0}'")]
    UnknownSymmetry(String),

    #[error("Elastic constant matrix is singular")]
    SingularElasticConstants,

    #[error("No sign change of the secular function in [{lower}, {upper}]")]
    NoRoot { lower: f64, upper: f64 },

    // Array bounds errors
    #[error("Atom index {index} out of range (total atoms: {n_atoms})")]
    InvalidAtomIndex { index: usize, n_atoms: usize },
}

pub type Result<T> = std::result::Result<T, ElasticError>;
