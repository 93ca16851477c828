//! Local header layout and parsing.

use std::io::{Read, Seek};

use cdrpack_common::StreamReader;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{Error, Result};

/// Fixed part of a local header, after its signature.
///
/// Followed on disk by the name, the extra field, then the payload bytes.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct LocalFileHeader {
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: u16,
    /// DOS time and date, unused.
    pub last_modified: u32,
    /// Zero when the data-descriptor flag is set, as are both sizes.
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_length: u16,
    pub extra_field_length: u16,
}

impl LocalFileHeader {
    /// `PK\x03\x04`
    pub const MAGIC: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];
    pub const SIGNATURE: u32 = 0x04034b50;
}

/// A parsed local header: the fields cross-checked against the directory,
/// plus where the payload begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalHeader {
    pub flags: u16,
    pub compression_method: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    /// Embedded name. Never used for lookup.
    pub name: Vec<u8>,
    /// Absolute offset of the first payload byte.
    pub data_offset: u64,
}

impl LocalHeader {
    /// Read a local header at the reader's position.
    ///
    /// On success the reader is left at the first payload byte.
    pub fn read<R: Read + Seek + ?Sized>(reader: &mut StreamReader<'_, R>) -> Result<Self> {
        let signature = reader.read_u32()?;
        if signature != LocalFileHeader::SIGNATURE {
            return Err(Error::InvalidSignature {
                expected: LocalFileHeader::SIGNATURE,
                actual: signature,
            });
        }

        let header: LocalFileHeader = reader.read_struct()?;
        let name = reader.read_bytes(header.file_name_length as usize)?;
        reader.advance(header.extra_field_length as u64)?;

        Ok(Self {
            flags: header.flags,
            compression_method: header.compression_method,
            crc32: header.crc32,
            compressed_size: header.compressed_size,
            uncompressed_size: header.uncompressed_size,
            name,
            data_offset: reader.position(),
        })
    }
}
