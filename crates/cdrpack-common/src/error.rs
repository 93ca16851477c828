//! Error types for cdrpack-common.

use thiserror::Error;

/// Common error type for cdrpack operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of the source reached while reading.
    #[error("unexpected end of source: needed {needed} bytes but only {available} available")]
    UnexpectedEof { needed: u64, available: u64 },

    /// Seek target lies outside the source.
    #[error("offset {offset} is outside a source of {len} bytes")]
    OutOfRange { offset: u64, len: u64 },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
