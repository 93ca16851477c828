//! End of central directory record: layout and forward scan.

use std::io::{Read, Seek};

use cdrpack_common::StreamReader;
use memchr::memmem;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{Error, Result};

/// Bytes pulled from the source per scan step.
const SCAN_CHUNK: usize = 64 * 1024;

/// Fixed part of the end of central directory record, after its signature.
///
/// Only the directory offset is used. Disk numbers and counts are parsed but
/// not trusted; the directory is walked until a non-entry signature instead.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct EocdRecord {
    pub disk_number: u16,
    pub central_dir_disk: u16,
    pub central_dir_count_disk: u16,
    pub central_dir_count_total: u16,
    pub central_dir_size: u32,
    /// Absolute offset of the first directory entry.
    pub central_dir_offset: u32,
    pub comment_length: u16,
}

impl EocdRecord {
    /// `PK\x05\x06`
    pub const MAGIC: [u8; 4] = [0x50, 0x4b, 0x05, 0x06];
    pub const SIGNATURE: u32 = 0x06054b50;

    /// Find the first EOCD signature at or after `start`.
    ///
    /// This is a forward scan, not the usual backward search from the end of
    /// the file: the first occurrence wins, even if it sits inside payload
    /// bytes. Each chunk keeps the last three bytes of the previous one, so a
    /// signature split across two reads is still found. On success the reader
    /// is left positioned at the returned offset.
    pub fn locate<R: Read + Seek + ?Sized>(
        reader: &mut StreamReader<'_, R>,
        start: u64,
    ) -> Result<u64> {
        reader.seek(start)?;

        let finder = memmem::Finder::new(&Self::MAGIC);
        let mut window = Vec::with_capacity(SCAN_CHUNK + Self::MAGIC.len());
        let mut window_start = start;

        while !reader.is_empty() {
            let take = reader.remaining().min(SCAN_CHUNK as u64) as usize;
            reader.read_append(&mut window, take)?;

            if let Some(index) = finder.find(&window) {
                let offset = window_start + index as u64;
                reader.seek(offset)?;
                return Ok(offset);
            }

            let keep = window.len().min(Self::MAGIC.len() - 1);
            let consumed = window.len() - keep;
            window.drain(..consumed);
            window_start += consumed as u64;
        }

        Err(Error::EocdNotFound)
    }

    /// Read a signature-prefixed record at the reader's position.
    pub fn read<R: Read + Seek + ?Sized>(reader: &mut StreamReader<'_, R>) -> Result<Self> {
        let signature = reader.read_u32()?;
        if signature != Self::SIGNATURE {
            return Err(Error::InvalidSignature {
                expected: Self::SIGNATURE,
                actual: signature,
            });
        }

        Ok(reader.read_struct()?)
    }
}
