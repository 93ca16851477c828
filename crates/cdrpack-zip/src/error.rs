//! Error types for the container reader.

use thiserror::Error;

use crate::decompress::CodecFailure;
use crate::validate::HeaderField;

/// Errors that can occur when reading a payload container.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Short read, out-of-range seek or I/O failure from the field reader.
    #[error("{0}")]
    Common(#[from] cdrpack_common::Error),

    /// Invalid ZIP magic bytes.
    #[error("invalid ZIP signature: expected {expected:#010x}, got {actual:#010x}")]
    InvalidSignature { expected: u32, actual: u32 },

    /// Could not find the end of central directory record.
    #[error("could not find end of central directory record")]
    EocdNotFound,

    /// The central directory holds no entries.
    #[error("central directory contains no entries")]
    EmptyDirectory,

    /// The source was examined and rejected as a container.
    ///
    /// `cause` keeps the classification of the failure that rejected it.
    #[error("source is not a payload container: {detail}")]
    NotAnArchive { cause: ErrorKind, detail: String },

    /// A payload declares more uncompressed bytes than the configured limit.
    #[error("payload {name} declares {size} bytes, above the {limit} byte limit")]
    PayloadTooLarge { name: String, size: u64, limit: u64 },

    /// Local header disagrees with its central directory entry.
    #[error("local header of {name} disagrees with its directory entry on {field}")]
    InconsistentHeader { name: String, field: HeaderField },

    /// Payload bytes do not hash to the recorded CRC-32.
    #[error("CRC-32 mismatch in {name}: expected {expected:#010x}, got {actual:#010x}")]
    CrcMismatch {
        name: String,
        expected: u32,
        actual: u32,
    },

    /// Decompression error.
    #[error("decompression error: {0}")]
    Decompression(CodecFailure),

    /// Entry not found.
    #[error("entry not found: {0}")]
    EntryNotFound(String),
}

/// Coarse classification of [`Error`] values.
///
/// Callers use this to tell "no such payload" apart from "archive unreadable"
/// without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad magic or malformed layout.
    Format,
    /// Short read, seek failure, or premature end of source.
    Io,
    /// Local header or checksum disagrees with the directory.
    Consistency,
    /// Deflate failure.
    Codec,
    /// No directory entry matches the requested name.
    NotFound,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) | Error::Common(_) => ErrorKind::Io,
            Error::InvalidSignature { .. }
            | Error::EocdNotFound
            | Error::EmptyDirectory
            | Error::PayloadTooLarge { .. } => ErrorKind::Format,
            Error::NotAnArchive { cause, .. } => *cause,
            Error::InconsistentHeader { .. } | Error::CrcMismatch { .. } => ErrorKind::Consistency,
            Error::Decompression(_) => ErrorKind::Codec,
            Error::EntryNotFound(_) => ErrorKind::NotFound,
        }
    }
}

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_keeps_cause() {
        let err = Error::NotAnArchive {
            cause: ErrorKind::Consistency,
            detail: "local header of meta disagrees".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Consistency);
        assert!(err.to_string().contains("meta"));
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Error::EocdNotFound.kind(), ErrorKind::Format);
        assert_eq!(Error::EntryNotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(Error::Decompression(CodecFailure::DataError).kind(), ErrorKind::Codec);
        let eof = cdrpack_common::Error::UnexpectedEof {
            needed: 4,
            available: 0,
        };
        assert_eq!(Error::from(eof).kind(), ErrorKind::Io);
    }
}
