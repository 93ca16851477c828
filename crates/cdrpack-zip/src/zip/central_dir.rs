//! Central directory entry layout.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Fixed part of a central directory entry, after its signature.
///
/// Followed on disk by the name, the extra field and the comment. Only the
/// name is kept; the other two are skipped using their lengths.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct CentralDirectoryHeader {
    pub version_made_by: u16,
    pub version_needed: u16,
    /// Bit 3 defers CRC and sizes to a data descriptor.
    pub flags: u16,
    /// 0 = stored, 8 = deflate.
    pub compression_method: u16,
    /// DOS time in the low half, DOS date in the high half.
    pub last_modified: u32,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_length: u16,
    pub extra_field_length: u16,
    pub file_comment_length: u16,
    /// Ignored; multi-volume sets are not read.
    pub disk_number_start: u16,
    pub internal_attrs: u16,
    pub external_attrs: u32,
    /// Absolute offset of the matching local header.
    pub local_header_offset: u32,
}

impl CentralDirectoryHeader {
    /// `PK\x01\x02`
    pub const MAGIC: [u8; 4] = [0x50, 0x4b, 0x01, 0x02];
    pub const SIGNATURE: u32 = 0x02014b50;

    /// Bytes of extra field and comment that follow the file name.
    pub fn trailing_data_size(&self) -> u64 {
        self.extra_field_length as u64 + self.file_comment_length as u64
    }
}
