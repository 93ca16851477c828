//! Container detection and payload extraction.

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use cdrpack_common::{crc, StreamReader};
use log::debug;
use memmap2::Mmap;

use crate::decompress;
use crate::directory::Directory;
use crate::entry::DirectoryEntry;
use crate::error::ErrorKind;
use crate::payload::{Payload, StoredRange};
use crate::validate;
use crate::zip::{CompressionMethod, EocdRecord, LocalHeader};
use crate::{Error, Result};

/// Tunables for an [`Archive`].
#[derive(Debug, Clone, Default)]
pub struct ArchiveOptions {
    /// Offset the end-record scan starts from.
    pub scan_start: u64,
    /// Refuse to inflate payloads that declare more bytes than this.
    pub max_payload_size: Option<u64>,
}

impl ArchiveOptions {
    /// Start the end-record scan at `offset` instead of the start of the source.
    pub fn with_scan_start(mut self, offset: u64) -> Self {
        self.scan_start = offset;
        self
    }

    /// Cap the size of inflated payloads.
    pub fn with_max_payload_size(mut self, limit: u64) -> Self {
        self.max_payload_size = Some(limit);
        self
    }
}

/// Outcome of container detection.
///
/// Moves out of `Unattempted` at most once; later queries only read it.
#[derive(Debug, Clone)]
pub enum ArchiveState {
    /// Detection has not run yet.
    Unattempted,
    /// Detection failed and will not be retried.
    Rejected {
        /// Classification of the failure.
        cause: ErrorKind,
        /// Rendered failure, for diagnostics.
        detail: String,
    },
    /// Detection succeeded; the directory is cached.
    Accepted {
        /// Every entry of the central directory.
        directory: Directory,
        /// Offset of the end of central directory record.
        end_offset: u64,
    },
}

/// A payload container over a seekable byte source.
///
/// Every operation that touches the source takes `&mut self`, and a stored
/// [`Payload`] keeps that borrow alive, so reads against the source can never
/// interleave. Directory queries ([`entry`](Self::entry),
/// [`entries`](Self::entries)) only need `&self`.
///
/// # Example
///
/// ```no_run
/// use cdrpack_zip::Archive;
///
/// let mut archive = Archive::open("drawing.cdr")?;
/// if archive.is_container() {
///     let content = archive.payload_str("content/riffData.cdr")?.into_vec()?;
///     println!("{} bytes", content.len());
/// }
/// # Ok::<(), cdrpack_zip::Error>(())
/// ```
pub struct Archive<R> {
    source: R,
    options: ArchiveOptions,
    state: ArchiveState,
}

impl Archive<Cursor<Mmap>> {
    /// Open a file through a read-only memory map.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self::new(Cursor::new(mmap)))
    }
}

impl<R: Read + Seek> Archive<R> {
    /// Wrap a source with default options. Nothing is read until the first query.
    pub fn new(source: R) -> Self {
        Self::with_options(source, ArchiveOptions::default())
    }

    /// Wrap a source with explicit options.
    pub fn with_options(source: R, options: ArchiveOptions) -> Self {
        Self {
            source,
            options,
            state: ArchiveState::Unattempted,
        }
    }

    /// Current detection state.
    #[inline]
    pub fn state(&self) -> &ArchiveState {
        &self.state
    }

    /// Borrow the underlying source.
    #[inline]
    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// Take back the underlying source.
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Decide whether the source is a payload container.
    ///
    /// The first call locates the end record, reads the central directory and
    /// spot-checks the local header of the lexicographically first entry.
    /// The outcome is cached: later calls never touch the source again.
    pub fn is_container(&mut self) -> bool {
        if let ArchiveState::Unattempted = self.state {
            self.state = match Self::detect(&mut self.source, &self.options) {
                Ok((directory, end_offset)) => {
                    debug!(
                        "accepted container: {} entries, end record at {}",
                        directory.len(),
                        end_offset
                    );
                    ArchiveState::Accepted {
                        directory,
                        end_offset,
                    }
                }
                Err(e) => {
                    debug!("rejected container: {}", e);
                    ArchiveState::Rejected {
                        cause: e.kind(),
                        detail: e.to_string(),
                    }
                }
            };
        }

        matches!(self.state, ArchiveState::Accepted { .. })
    }

    /// The cached directory, if the source was accepted.
    pub fn directory(&self) -> Option<&Directory> {
        match &self.state {
            ArchiveState::Accepted { directory, .. } => Some(directory),
            _ => None,
        }
    }

    /// Iterate entries in name order. Empty unless the source was accepted.
    pub fn entries(&self) -> impl Iterator<Item = &DirectoryEntry> + '_ {
        self.directory().into_iter().flat_map(Directory::iter)
    }

    /// Resolve a name the same way [`payload`](Self::payload) does, without
    /// touching the source.
    pub fn entry(&self, name: &[u8]) -> Option<&DirectoryEntry> {
        self.directory()?.lookup(name)
    }

    /// Extract the payload stored under `name`.
    ///
    /// Runs detection first if needed. The name resolves by exact match or,
    /// failing that, as a literal prefix of a longer stored name (see
    /// [`Directory::lookup`]). The entry's local header is re-read and
    /// re-validated before any payload byte is touched.
    ///
    /// Stored entries come back as a window over the source. Every other
    /// method is handed to the raw-deflate decoder; codes other than 8 are
    /// not rejected up front and fail there if they are not deflate data.
    pub fn payload(&mut self, name: &[u8]) -> Result<Payload<'_, R>> {
        self.is_container();

        let directory = match &self.state {
            ArchiveState::Accepted { directory, .. } => directory,
            ArchiveState::Rejected { cause, detail } => {
                return Err(Error::NotAnArchive {
                    cause: *cause,
                    detail: detail.clone(),
                })
            }
            ArchiveState::Unattempted => unreachable!("detection runs before lookup"),
        };

        let entry = directory
            .lookup(name)
            .ok_or_else(|| Error::EntryNotFound(String::from_utf8_lossy(name).into_owned()))?;

        Self::extract(&mut self.source, entry, &self.options)
    }

    /// [`payload`](Self::payload) for UTF-8 names.
    pub fn payload_str(&mut self, name: &str) -> Result<Payload<'_, R>> {
        self.payload(name.as_bytes())
    }

    /// Extract `name` and compare its CRC-32 with the directory's.
    pub fn verify(&mut self, name: &[u8]) -> Result<()> {
        self.is_container();
        let (expected, label) = match self.entry(name) {
            Some(entry) => (entry.crc32(), entry.name_lossy().into_owned()),
            None => {
                // Let payload() report the rejection or the missing name.
                self.payload(name)?;
                return Err(Error::EntryNotFound(String::from_utf8_lossy(name).into_owned()));
            }
        };

        let actual = match self.payload(name)? {
            Payload::Stored(mut range) => crc::hash_reader(&mut range)?,
            Payload::Inflated(data) => crc::hash_bytes(&data),
        };

        if actual != expected {
            return Err(Error::CrcMismatch {
                name: label,
                expected,
                actual,
            });
        }
        Ok(())
    }

    fn detect(source: &mut R, options: &ArchiveOptions) -> Result<(Directory, u64)> {
        let mut reader = StreamReader::new(source)?;

        let end_offset = EocdRecord::locate(&mut reader, options.scan_start)?;
        let end = EocdRecord::read(&mut reader)?;
        let directory = Directory::read(&mut reader, &end)?;

        let first = directory.first().ok_or(Error::EmptyDirectory)?;
        reader.seek(first.local_header_offset())?;
        let local = LocalHeader::read(&mut reader)?;
        check_consistency(&local, first)?;

        Ok((directory, end_offset))
    }

    fn extract<'a>(
        source: &'a mut R,
        entry: &DirectoryEntry,
        options: &ArchiveOptions,
    ) -> Result<Payload<'a, R>> {
        let mut reader = StreamReader::new_at(source, entry.local_header_offset())?;
        let local = LocalHeader::read(&mut reader)?;
        check_consistency(&local, entry)?;

        match entry.compression_method() {
            CompressionMethod::Store => {
                let len = entry.compressed_size();
                if reader.remaining() < len {
                    return Err(cdrpack_common::Error::UnexpectedEof {
                        needed: len,
                        available: reader.remaining(),
                    }
                    .into());
                }
                let range = StoredRange::new(reader.into_inner(), local.data_offset, len)?;
                Ok(Payload::Stored(range))
            }
            method => {
                if let CompressionMethod::Other(code) = method {
                    debug!(
                        "{}: method {} is not deflate, decoding as deflate anyway",
                        entry.name_lossy(),
                        code
                    );
                }

                let size = entry.uncompressed_size();
                if let Some(limit) = options.max_payload_size {
                    if size > limit {
                        return Err(Error::PayloadTooLarge {
                            name: entry.name_lossy().into_owned(),
                            size,
                            limit,
                        });
                    }
                }

                let compressed = reader.read_bytes(entry.compressed_size() as usize)?;
                let data = decompress::inflate_raw(&compressed, size as usize)
                    .map_err(Error::Decompression)?;
                Ok(Payload::Inflated(data))
            }
        }
    }
}

fn check_consistency(local: &LocalHeader, entry: &DirectoryEntry) -> Result<()> {
    match validate::first_mismatch(local, entry) {
        Some(field) => Err(Error::InconsistentHeader {
            name: entry.name_lossy().into_owned(),
            field,
        }),
        None => Ok(()),
    }
}

impl<R> std::fmt::Debug for Archive<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("options", &self.options)
            .field("state", &self.state)
            .finish()
    }
}
