//! Central directory table.

use std::collections::BTreeMap;
use std::io::{Read, Seek};
use std::ops::Bound;

use cdrpack_common::StreamReader;
use log::trace;

use crate::entry::DirectoryEntry;
use crate::zip::{CentralDirectoryHeader, EocdRecord};
use crate::{Error, Result};

/// Name-ordered table of every entry in the central directory.
///
/// Built once per archive and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Directory {
    entries: BTreeMap<Vec<u8>, DirectoryEntry>,
}

impl Directory {
    /// Parse the central directory that `end` points at.
    ///
    /// Parsing stops at the first record that is not a directory entry
    /// (usually the end record itself, sometimes a digital signature) or at a
    /// clean end of source. A later entry with a repeated name replaces the
    /// earlier one.
    pub fn read<R: Read + Seek + ?Sized>(
        reader: &mut StreamReader<'_, R>,
        end: &EocdRecord,
    ) -> Result<Self> {
        reader.seek(end.central_dir_offset as u64)?;

        let mut entries = BTreeMap::new();
        while !reader.is_empty() {
            let signature = reader.read_u32()?;
            if signature != CentralDirectoryHeader::SIGNATURE {
                break;
            }

            let header: CentralDirectoryHeader = reader.read_struct()?;
            let name = reader.read_bytes(header.file_name_length as usize)?;
            reader.advance(header.trailing_data_size())?;

            let entry = DirectoryEntry::from_header(&header, name.clone());
            trace!(
                "directory entry {} ({}, {} -> {} bytes, local header at {})",
                entry.name_lossy(),
                entry.compression_method(),
                entry.compressed_size(),
                entry.uncompressed_size(),
                entry.local_header_offset()
            );
            entries.insert(name, entry);
        }

        if entries.is_empty() {
            return Err(Error::EmptyDirectory);
        }

        Ok(Self { entries })
    }

    /// Number of distinct names.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a directory produced by [`Directory::read`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The lexicographically smallest entry.
    pub fn first(&self) -> Option<&DirectoryEntry> {
        self.entries.values().next()
    }

    /// Iterate entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = &DirectoryEntry> + '_ {
        self.entries.values()
    }

    /// Resolve `name` to an entry.
    ///
    /// Takes the smallest stored name that is not less than `name`. It
    /// matches when it equals `name`, or when it is longer and starts with
    /// `name` byte for byte. No separator boundary is required, so `roo`
    /// resolves to `root/x` just as `root` does.
    pub fn lookup(&self, name: &[u8]) -> Option<&DirectoryEntry> {
        let (key, entry) = self
            .entries
            .range::<[u8], _>((Bound::Included(name), Bound::Unbounded))
            .next()?;

        if key.as_slice() == name || (key.len() > name.len() && key.starts_with(name)) {
            Some(entry)
        } else {
            None
        }
    }
}
