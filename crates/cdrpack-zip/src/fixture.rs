//! In-memory container builder used by the unit tests.

use std::io::{self, Read, Seek, SeekFrom, Write};

use cdrpack_common::crc;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use zerocopy::{FromBytes, IntoBytes};

use crate::zip::{CentralDirectoryHeader, EocdRecord, LocalFileHeader};

/// One member of a test container.
///
/// `local` and `central` start out consistent; tests tamper with them before
/// calling [`build`]. Name/extra/comment lengths and the local header offset
/// are always recomputed by the builder.
pub struct Member {
    pub name: Vec<u8>,
    pub data: Vec<u8>,
    pub extra: Vec<u8>,
    pub comment: Vec<u8>,
    pub local: LocalFileHeader,
    pub central: CentralDirectoryHeader,
}

impl Member {
    pub fn stored(name: &str, data: &[u8]) -> Self {
        Self::with_method(name, data.to_vec(), 0, crc::hash_bytes(data), data.len())
    }

    pub fn deflated(name: &str, data: &[u8]) -> Self {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        let compressed = encoder.finish().unwrap();
        Self::with_method(name, compressed, 8, crc::hash_bytes(data), data.len())
    }

    fn with_method(name: &str, data: Vec<u8>, method: u16, crc32: u32, size: usize) -> Self {
        let mut local = LocalFileHeader::read_from_bytes(&[0u8; 26]).unwrap();
        local.version_needed = 20;
        local.compression_method = method;
        local.crc32 = crc32;
        local.compressed_size = data.len() as u32;
        local.uncompressed_size = size as u32;

        let mut central = CentralDirectoryHeader::read_from_bytes(&[0u8; 42]).unwrap();
        central.version_made_by = 20;
        central.version_needed = 20;
        central.compression_method = method;
        central.crc32 = crc32;
        central.compressed_size = data.len() as u32;
        central.uncompressed_size = size as u32;

        Self {
            name: name.as_bytes().to_vec(),
            data,
            extra: Vec::new(),
            comment: Vec::new(),
            local,
            central,
        }
    }

    /// Set the same flag bits on both headers.
    pub fn flags(mut self, flags: u16) -> Self {
        self.local.flags = flags;
        self.central.flags = flags;
        self
    }
}

pub fn build(members: &[Member]) -> Vec<u8> {
    build_with(&[], members, &[])
}

/// Assemble `preamble`, the members, the central directory, `between`, and
/// the end record, in that order.
pub fn build_with(preamble: &[u8], members: &[Member], between: &[u8]) -> Vec<u8> {
    let mut out = preamble.to_vec();
    let mut directory = Vec::new();

    for member in members {
        let offset = out.len() as u32;

        let mut local = member.local;
        local.file_name_length = member.name.len() as u16;
        local.extra_field_length = member.extra.len() as u16;
        out.extend_from_slice(&LocalFileHeader::MAGIC);
        out.extend_from_slice(local.as_bytes());
        out.extend_from_slice(&member.name);
        out.extend_from_slice(&member.extra);
        out.extend_from_slice(&member.data);

        let mut central = member.central;
        central.file_name_length = member.name.len() as u16;
        central.extra_field_length = member.extra.len() as u16;
        central.file_comment_length = member.comment.len() as u16;
        central.local_header_offset = offset;
        directory.extend_from_slice(&CentralDirectoryHeader::MAGIC);
        directory.extend_from_slice(central.as_bytes());
        directory.extend_from_slice(&member.name);
        directory.extend_from_slice(&member.extra);
        directory.extend_from_slice(&member.comment);
    }

    let central_dir_offset = out.len() as u32;
    let central_dir_size = directory.len() as u32;
    out.extend_from_slice(&directory);
    out.extend_from_slice(between);

    let record = EocdRecord {
        disk_number: 0,
        central_dir_disk: 0,
        central_dir_count_disk: members.len() as u16,
        central_dir_count_total: members.len() as u16,
        central_dir_size,
        central_dir_offset,
        comment_length: 0,
    };
    out.extend_from_slice(&EocdRecord::MAGIC);
    out.extend_from_slice(record.as_bytes());
    out
}

/// Wraps a source and counts the calls made against it.
#[derive(Debug)]
pub struct CountingReader<R> {
    inner: R,
    pub reads: usize,
    pub seeks: usize,
}

impl<R> CountingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            reads: 0,
            seeks: 0,
        }
    }

    pub fn calls(&self) -> usize {
        self.reads + self.seeks
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        self.inner.read(buf)
    }
}

impl<R: Seek> Seek for CountingReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.seeks += 1;
        self.inner.seek(pos)
    }
}
