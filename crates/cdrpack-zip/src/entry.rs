//! Central directory entry.

use std::borrow::Cow;

use crate::zip::{flags, CentralDirectoryHeader, CompressionMethod};

/// An entry (payload) listed in the central directory.
///
/// This contains metadata about the payload, not the payload bytes itself.
/// Use [`Archive::payload`](crate::Archive::payload) to get the contents.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DirectoryEntry {
    /// Byte-exact name; the lookup key.
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_name"))]
    name: Vec<u8>,
    /// General purpose bit flag.
    flags: u16,
    /// Compression method code.
    compression_method: u16,
    /// CRC32 checksum of uncompressed data.
    crc32: u32,
    /// Compressed size in bytes.
    compressed_size: u32,
    /// Uncompressed size in bytes.
    uncompressed_size: u32,
    /// Offset to the local file header in the source.
    local_header_offset: u32,
}

impl DirectoryEntry {
    pub(crate) fn from_header(header: &CentralDirectoryHeader, name: Vec<u8>) -> Self {
        Self {
            name,
            flags: header.flags,
            compression_method: header.compression_method,
            crc32: header.crc32,
            compressed_size: header.compressed_size,
            uncompressed_size: header.uncompressed_size,
            local_header_offset: header.local_header_offset,
        }
    }

    /// Get the raw name bytes.
    #[inline]
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Get the name as text, replacing invalid UTF-8.
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    /// Get the general purpose flag bits.
    #[inline]
    pub fn flags(&self) -> u16 {
        self.flags
    }

    /// Get the raw compression method code.
    #[inline]
    pub fn method_code(&self) -> u16 {
        self.compression_method
    }

    /// Get the compression method.
    #[inline]
    pub fn compression_method(&self) -> CompressionMethod {
        CompressionMethod::from(self.compression_method)
    }

    /// Get the CRC32 checksum.
    #[inline]
    pub fn crc32(&self) -> u32 {
        self.crc32
    }

    /// Get the compressed size in bytes.
    #[inline]
    pub fn compressed_size(&self) -> u64 {
        self.compressed_size as u64
    }

    /// Get the uncompressed size in bytes.
    #[inline]
    pub fn uncompressed_size(&self) -> u64 {
        self.uncompressed_size as u64
    }

    /// Get the offset to the local file header.
    #[inline]
    pub fn local_header_offset(&self) -> u64 {
        self.local_header_offset as u64
    }

    /// Check whether CRC and sizes were deferred to a trailing data descriptor.
    #[inline]
    pub fn has_data_descriptor(&self) -> bool {
        self.flags & flags::DATA_DESCRIPTOR != 0
    }

    /// Check if this entry represents a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.name.ends_with(b"/") || self.name.ends_with(b"\\")
    }
}

#[cfg(feature = "serde")]
fn serialize_name<S: serde::Serializer>(name: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(name))
}
