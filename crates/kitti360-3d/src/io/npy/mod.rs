mod parser;

pub use parser::*;

/// Error types for the NPY module.
#[derive(Debug, thiserror::Error)]
pub enum NpyError {
    /// Failed to read or write the file
    #[error("Failed to read or write NPY file")]
    Io(#[from] std::io::Error),

    /// The file does not start with the NPY magic string
    #[error("Not an NPY file")]
    InvalidMagic,

    /// The header dictionary could not be understood
    #[error("Invalid NPY header: {0}")]
    InvalidHeader(String),

    /// Only little endian float64 C-ordered arrays are supported
    #[error("Unsupported NPY array: {0}")]
    Unsupported(String),

    /// The data does not match the shape of the header
    #[error("NPY shape mismatch: expected {expected} values, found {found}")]
    ShapeMismatch {
        /// Number of values announced by the header.
        expected: usize,
        /// Number of values present in the file.
        found: usize,
    },
}
