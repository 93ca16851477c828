//! Extracted payloads.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

use crate::Result;

/// A named payload handed back by [`Archive::payload`](crate::Archive::payload).
///
/// The two variants have different lifetime contracts and are never converted
/// into each other implicitly; use [`Payload::into_vec`] to materialize.
pub enum Payload<'a, R: ?Sized> {
    /// Stored bytes, read in place from the archive's source.
    Stored(StoredRange<'a, R>),
    /// Inflated bytes, owned.
    Inflated(Vec<u8>),
}

impl<'a, R: Read + Seek + ?Sized> Payload<'a, R> {
    /// Payload length in bytes.
    pub fn len(&self) -> u64 {
        match self {
            Self::Stored(range) => range.len(),
            Self::Inflated(data) => data.len() as u64,
        }
    }

    /// Check whether the payload has no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether the payload still borrows the archive's source.
    pub fn is_borrowed(&self) -> bool {
        matches!(self, Self::Stored(_))
    }

    /// Collect the payload into an owned buffer.
    pub fn into_vec(self) -> Result<Vec<u8>> {
        match self {
            Self::Stored(range) => range.into_vec(),
            Self::Inflated(data) => Ok(data),
        }
    }
}

impl<R: ?Sized> fmt::Debug for Payload<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stored(range) => f.debug_tuple("Stored").field(range).finish(),
            Self::Inflated(data) => f.debug_tuple("Inflated").field(&data.len()).finish(),
        }
    }
}

/// A window over `len` bytes of a source, starting at `start`.
///
/// Holds the source's mutable borrow for as long as it lives, so nothing else
/// can move the source's cursor underneath it.
pub struct StoredRange<'a, R: ?Sized> {
    source: &'a mut R,
    start: u64,
    len: u64,
    position: u64,
}

impl<'a, R: Read + Seek + ?Sized> StoredRange<'a, R> {
    pub(crate) fn new(source: &'a mut R, start: u64, len: u64) -> io::Result<Self> {
        source.seek(SeekFrom::Start(start))?;
        Ok(Self {
            source,
            start,
            len,
            position: 0,
        })
    }

    /// Absolute offset of the first byte in the source.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.start
    }

    /// Length of the window.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Check whether the window is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read the whole window, regardless of the current position.
    pub fn into_vec(mut self) -> Result<Vec<u8>> {
        self.seek(SeekFrom::Start(0))?;
        let mut data = Vec::with_capacity(self.len as usize);
        self.read_to_end(&mut data)?;

        if data.len() as u64 != self.len {
            return Err(cdrpack_common::Error::UnexpectedEof {
                needed: self.len,
                available: data.len() as u64,
            }
            .into());
        }
        Ok(data)
    }
}

impl<R: Read + Seek + ?Sized> Read for StoredRange<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.len.saturating_sub(self.position);
        let want = (buf.len() as u64).min(remaining) as usize;
        if want == 0 {
            return Ok(0);
        }

        let n = self.source.read(&mut buf[..want])?;
        self.position += n as u64;
        Ok(n)
    }
}

impl<R: Read + Seek + ?Sized> Seek for StoredRange<'_, R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
            SeekFrom::End(delta) => self.len.checked_add_signed(delta),
        };
        let target = target.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek outside of stored payload")
        })?;
        let absolute = self.start.checked_add(target).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek outside of stored payload")
        })?;

        self.source.seek(SeekFrom::Start(absolute))?;
        self.position = target;
        Ok(target)
    }
}

impl<R: ?Sized> fmt::Debug for StoredRange<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredRange")
            .field("start", &self.start)
            .field("len", &self.len)
            .field("position", &self.position)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_range_reads_only_its_window() {
        let mut source = Cursor::new(b"0123456789".to_vec());
        let mut range = StoredRange::new(&mut source, 2, 5).unwrap();

        let mut out = String::new();
        range.read_to_string(&mut out).unwrap();
        assert_eq!(out, "23456");
        assert_eq!(range.read(&mut [0u8; 4]).unwrap(), 0);
    }

    #[test]
    fn test_range_seek() {
        let mut source = Cursor::new(b"0123456789".to_vec());
        let mut range = StoredRange::new(&mut source, 2, 5).unwrap();

        assert_eq!(range.seek(SeekFrom::End(-2)).unwrap(), 3);
        let mut buf = [0u8; 8];
        let n = range.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"56");

        assert_eq!(range.seek(SeekFrom::Current(-4)).unwrap(), 1);
        assert_eq!(range.read(&mut buf[..1]).unwrap(), 1);
        assert_eq!(buf[0], b'3');

        assert!(range.seek(SeekFrom::Current(-10)).is_err());
    }

    #[test]
    fn test_into_vec_from_any_position() {
        let mut source = Cursor::new(b"0123456789".to_vec());
        let mut range = StoredRange::new(&mut source, 7, 3).unwrap();
        range.read_exact(&mut [0u8; 2]).unwrap();

        assert_eq!(Payload::Stored(range).into_vec().unwrap(), b"789");
    }

    #[test]
    fn test_into_vec_detects_short_source() {
        let mut source = Cursor::new(b"0123".to_vec());
        let range = StoredRange::new(&mut source, 2, 5).unwrap();

        assert!(range.into_vec().is_err());
    }

    #[test]
    fn test_payload_variants() {
        let mut source = Cursor::new(b"abc".to_vec());
        let stored = Payload::Stored(StoredRange::new(&mut source, 0, 3).unwrap());
        assert!(stored.is_borrowed());
        assert_eq!(stored.len(), 3);

        let inflated: Payload<'_, Cursor<Vec<u8>>> = Payload::Inflated(Vec::new());
        assert!(!inflated.is_borrowed());
        assert!(inflated.is_empty());
    }
}
