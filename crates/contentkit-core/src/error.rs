//! Error types for the core library.

use thiserror::Error;

/// Core library error type.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The same parameter name appeared twice on one command line.
    #[error("duplicate command-line parameter: {name}")]
    DuplicateParameter {
        /// Parameter name without its leading `-` or `/`.
        name: String,
    },

    /// An argument was outside the range an operation accepts.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Underlying filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;
