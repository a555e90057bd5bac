//! Error types for image URL building and lazy loading

use thiserror::Error;

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in luxeimg
#[derive(Error, Debug)]
pub enum Error {
    /// Container width was negative, NaN or infinite
    #[error("Invalid container width: {0}")]
    InvalidWidth(f64),

    /// Format name outside of avif/webp/jpg
    #[error("Unknown image format: {0}")]
    UnknownFormat(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Failed to parse an input document
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Filesystem error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}
