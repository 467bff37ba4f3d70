//! Error types for Stowage.

use thiserror::Error;

/// Common error type for Stowage.
#[derive(Error, Debug)]
pub enum StowageError {
    /// I/O error.
    ///
    /// Directory creation and file writes surface here unmodified.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An uploaded file exceeded the configured size limit.
    #[error("file too large (limit {limit} bytes)")]
    TooLarge { limit: u64 },

    /// The declared media type is not admitted by the upload filter.
    #[error("unsupported media type: {0}")]
    UnsupportedType(String),

    /// A request carried more files than allowed.
    #[error("too many files (max {max})")]
    TooManyFiles { max: usize },
}

/// Result type alias for Stowage operations.
pub type Result<T> = std::result::Result<T, StowageError>;
