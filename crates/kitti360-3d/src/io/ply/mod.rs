mod parser;
mod properties;
mod records;

pub use parser::*;
pub use properties::*;
pub use records::*;

/// Error types for the PLY module.
#[derive(Debug, thiserror::Error)]
pub enum PlyError {
    /// Failed to read PLY file
    #[error("Failed to read PLY file")]
    Io(#[from] std::io::Error),

    /// Failed to decode a binary record
    #[error("Failed to decode PLY record")]
    Deserialize(#[from] bincode::error::DecodeError),

    /// Unsupported PLY property
    #[error("Unsupported PLY property type: {0}")]
    UnsupportedProperty(String),

    /// Unsupported or malformed PLY header
    #[error("Unsupported PLY header: {0}")]
    UnsupportedHeader(String),

    /// The header properties do not match the record layout
    #[error("PLY schema does not match the record layout: {0}")]
    SchemaMismatch(String),

    /// The number of attribute records does not match the number of points
    #[error("PLY record count mismatch: expected {expected}, found {found}")]
    RecordCountMismatch {
        /// Number of points announced by the header or the geometry.
        expected: usize,
        /// Number of records available.
        found: usize,
    },
}
