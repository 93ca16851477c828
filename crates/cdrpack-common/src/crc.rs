//! CRC-32 checksum utilities.
//!
//! ZIP-style containers record the CRC-32 (IEEE polynomial) of every payload's
//! uncompressed bytes.

use std::io::{self, Read};

/// Compute the CRC-32 of a byte slice.
#[inline]
pub fn hash_bytes(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Compute the CRC-32 of everything a reader yields until end of stream.
pub fn hash_reader<R: Read + ?Sized>(reader: &mut R) -> io::Result<u32> {
    let mut hasher = crc32fast::Hasher::new();
    let mut buf = [0u8; 8192];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hasher.finalize())
}
