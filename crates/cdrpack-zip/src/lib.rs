//! Reader for ZIP-style payload containers.
//!
//! Newer drawing files are not a single stream: they are a container whose
//! named payloads (`content/riffData.cdr`, `META-INF/...`) are either stored
//! as-is or raw-deflated. This crate answers two questions about an arbitrary
//! seekable source:
//!
//! - Is this a container? ([`Archive::is_container`])
//! - What are the bytes stored under this name? ([`Archive::payload`])
//!
//! Detection is deliberately skeptical. The end of central directory record is
//! found by a forward scan, every directory entry is read into a name-ordered
//! table, and the local header of the first entry must agree with its
//! directory entry before the source is accepted. The verdict is cached.
//!
//! Supported compression methods:
//! - Stored (method 0), returned as a borrowed window over the source
//! - DEFLATE (method 8), inflated into an owned buffer
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use cdrpack_zip::Archive;
//!
//! let mut archive = Archive::new(File::open("drawing.cdr")?);
//! if archive.is_container() {
//!     for entry in archive.entries() {
//!         println!("{}: {} bytes", entry.name_lossy(), entry.uncompressed_size());
//!     }
//!     let root = archive.payload(b"content/root.dat")?.into_vec()?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod archive;
mod decompress;
mod directory;
mod entry;
mod error;
mod payload;
pub mod validate;
pub mod zip;

#[cfg(test)]
mod fixture;

pub use archive::{Archive, ArchiveOptions, ArchiveState};
pub use decompress::{inflate_raw, CodecFailure};
pub use directory::Directory;
pub use entry::DirectoryEntry;
pub use error::{Error, ErrorKind, Result};
pub use payload::{Payload, StoredRange};
pub use validate::HeaderField;
