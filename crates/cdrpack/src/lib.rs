//! Cdrpack - payload container reading for legacy drawing documents.
//!
//! This crate provides a unified interface to the cdrpack crates.
//!
//! # Crates
//!
//! - [`cdrpack_common`] - Bounded field reading and CRC-32
//! - [`cdrpack_zip`] - Container detection and payload extraction
//!
//! # Example
//!
//! ```no_run
//! use cdrpack::prelude::*;
//!
//! let mut archive = Archive::open("drawing.cdr")?;
//! if archive.is_container() {
//!     let riff = archive.payload_str("content/riffData.cdr")?.into_vec()?;
//!     println!("RIFF payload: {} bytes", riff.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use cdrpack_common as common;
pub use cdrpack_zip as zip;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use cdrpack_common::{crc, StreamReader};
    pub use cdrpack_zip::{
        Archive, ArchiveOptions, ArchiveState, DirectoryEntry, Error, ErrorKind, Payload,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
