//! Cross-checks between a local header and its central directory entry.

use std::fmt;

use crate::entry::DirectoryEntry;
use crate::zip::{flags, LocalHeader};

/// A header field that can disagree between local header and directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    Flags,
    CompressionMethod,
    Crc32,
    CompressedSize,
    UncompressedSize,
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Flags => "general purpose flags",
            Self::CompressionMethod => "compression method",
            Self::Crc32 => "CRC-32",
            Self::CompressedSize => "compressed size",
            Self::UncompressedSize => "uncompressed size",
        })
    }
}

/// Return the first field on which `local` and `entry` disagree.
///
/// Flags and compression method must always match. CRC and sizes are only
/// compared when the data-descriptor bit is clear, since writers that set it
/// leave those local fields zeroed or stale.
pub fn first_mismatch(local: &LocalHeader, entry: &DirectoryEntry) -> Option<HeaderField> {
    if local.flags != entry.flags() {
        return Some(HeaderField::Flags);
    }
    if local.compression_method != entry.method_code() {
        return Some(HeaderField::CompressionMethod);
    }
    if local.flags & flags::DATA_DESCRIPTOR == 0 {
        if local.crc32 != entry.crc32() {
            return Some(HeaderField::Crc32);
        }
        if local.compressed_size as u64 != entry.compressed_size() {
            return Some(HeaderField::CompressedSize);
        }
        if local.uncompressed_size as u64 != entry.uncompressed_size() {
            return Some(HeaderField::UncompressedSize);
        }
    }
    None
}

/// Check whether `local` agrees with `entry`.
#[inline]
pub fn is_consistent(local: &LocalHeader, entry: &DirectoryEntry) -> bool {
    first_mismatch(local, entry).is_none()
}

#[cfg(test)]
mod tests {
    use zerocopy::FromBytes;

    use super::*;
    use crate::zip::CentralDirectoryHeader;

    fn entry(flags: u16) -> DirectoryEntry {
        let mut header = CentralDirectoryHeader::read_from_bytes(&[0u8; 42]).unwrap();
        header.flags = flags;
        header.compression_method = 8;
        header.crc32 = 0xAABBCCDD;
        header.compressed_size = 10;
        header.uncompressed_size = 40;
        DirectoryEntry::from_header(&header, b"meta".to_vec())
    }

    fn local(flags: u16) -> LocalHeader {
        LocalHeader {
            flags,
            compression_method: 8,
            crc32: 0xAABBCCDD,
            compressed_size: 10,
            uncompressed_size: 40,
            name: b"meta".to_vec(),
            data_offset: 38,
        }
    }

    #[test]
    fn test_matching_headers() {
        assert!(is_consistent(&local(0), &entry(0)));
    }

    #[test]
    fn test_flags_must_match() {
        assert_eq!(
            first_mismatch(&local(0x0008), &entry(0)),
            Some(HeaderField::Flags)
        );
    }

    #[test]
    fn test_method_must_match_even_with_descriptor() {
        let mut header = local(0x0008);
        header.compression_method = 0;
        assert_eq!(
            first_mismatch(&header, &entry(0x0008)),
            Some(HeaderField::CompressionMethod)
        );
    }

    #[test]
    fn test_crc_and_sizes_compared_without_descriptor() {
        let mut header = local(0);
        header.crc32 = 0;
        assert_eq!(first_mismatch(&header, &entry(0)), Some(HeaderField::Crc32));

        let mut header = local(0);
        header.compressed_size = 11;
        assert_eq!(
            first_mismatch(&header, &entry(0)),
            Some(HeaderField::CompressedSize)
        );

        let mut header = local(0);
        header.uncompressed_size = 0;
        assert_eq!(
            first_mismatch(&header, &entry(0)),
            Some(HeaderField::UncompressedSize)
        );
    }

    #[test]
    fn test_descriptor_bit_skips_crc_and_sizes() {
        let mut header = local(0x0008);
        header.crc32 = 0;
        header.compressed_size = 0;
        header.uncompressed_size = 0;
        assert!(is_consistent(&header, &entry(0x0008)));
    }

    #[test]
    fn test_name_is_not_compared() {
        let mut header = local(0);
        header.name = b"other".to_vec();
        assert!(is_consistent(&header, &entry(0)));
    }
}
