//! Common utilities for cdrpack.
//!
//! This crate provides the foundational pieces shared by the cdrpack crates:
//!
//! - [`StreamReader`] - Bounded little-endian field reading over a `Read + Seek` source
//! - [`crc`] - CRC-32 checksums as used by ZIP-style containers

mod error;
mod reader;

pub mod crc;

pub use error::{Error, Result};
pub use reader::StreamReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
