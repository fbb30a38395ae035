//! Error types for the geometry cache codec.
//!
//! Only caller programming errors surface here. Degenerate or mismatched data
//! on the decode path has defined fallback results and never becomes an `Err`.

use thiserror::Error;

/// Main error type for cache operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A face references a vertex outside the position array.
    #[error("Face {face} references vertex {index} (vertex count: {count})")]
    InvalidFaceIndex { face: usize, index: i64, count: usize },

    /// A per-face-vertex attribute does not line up with the face-vertex occurrences.
    #[error("Attribute '{name}' has {actual} values, expected {expected}")]
    AttributeLengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// A face set names a face that does not exist.
    #[error("Face set '{name}' references face {face} (face count: {count})")]
    InvalidFaceSetIndex { name: String, face: i64, count: usize },

    /// Samples must be appended with strictly increasing indices.
    #[error("Sample index {index} out of order (expected {expected})")]
    SampleOutOfOrder { index: usize, expected: usize },

    /// Sample index out of bounds
    #[error("Sample index {index} out of bounds (count: {count})")]
    SampleOutOfBounds { index: usize, count: usize },

    /// Topology arrays exceed the 32-bit index range of the stored layout.
    #[error("Topology too large: {0} entries")]
    TopologyTooLarge(usize),

    /// Invalid configuration text.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an attribute length mismatch error.
    pub fn attribute_length(name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::AttributeLengthMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;
