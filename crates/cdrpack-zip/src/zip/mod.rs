//! ZIP format structures.
//!
//! This module contains the low-level structures for the subset of the ZIP
//! container format used by the document packages: stored and deflated
//! entries, no ZIP64, no encryption.

pub mod central_dir;
pub mod eocd;
pub mod local;

pub use central_dir::CentralDirectoryHeader;
pub use eocd::EocdRecord;
pub use local::{LocalFileHeader, LocalHeader};

/// General purpose flag bits.
pub mod flags {
    /// CRC-32 and sizes are deferred to a data descriptor after the payload.
    pub const DATA_DESCRIPTOR: u16 = 0x0008;
}

/// Compression method recorded for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CompressionMethod {
    /// No compression (stored).
    Store,
    /// Raw DEFLATE compression.
    Deflate,
    /// Any other method code.
    Other(u16),
}

impl CompressionMethod {
    /// The on-disk method code.
    pub fn code(self) -> u16 {
        match self {
            Self::Store => 0,
            Self::Deflate => 8,
            Self::Other(code) => code,
        }
    }
}

impl From<u16> for CompressionMethod {
    fn from(value: u16) -> Self {
        match value {
            0 => Self::Store,
            8 => Self::Deflate,
            other => Self::Other(other),
        }
    }
}

impl std::fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store => f.write_str("stored"),
            Self::Deflate => f.write_str("deflate"),
            Self::Other(code) => write!(f, "method {}", code),
        }
    }
}
