//! Bounded binary reader over seekable byte sources.
//!
//! This module provides [`StreamReader`], a cursor-like type that reads
//! little-endian fields from any `Read + Seek` source while tracking its own
//! position and refusing to read past the end of the source.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use zerocopy::FromBytes;

use crate::{Error, Result};

/// A binary reader over a borrowed `Read + Seek` source.
///
/// The source length is measured once on construction. Every read checks the
/// remaining length first, so a length field taken from untrusted input can
/// never drive an allocation larger than the source itself.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use cdrpack_common::StreamReader;
///
/// let mut source = Cursor::new(vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
/// let mut reader = StreamReader::new(&mut source).unwrap();
///
/// assert_eq!(reader.read_u32().unwrap(), 0x04030201);
/// assert_eq!(reader.read_u16().unwrap(), 0x0605);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug)]
pub struct StreamReader<'a, R: ?Sized> {
    inner: &'a mut R,
    position: u64,
    len: u64,
}

impl<'a, R: Read + Seek + ?Sized> StreamReader<'a, R> {
    /// Create a new reader positioned at the start of the source.
    pub fn new(inner: &'a mut R) -> Result<Self> {
        Self::new_at(inner, 0)
    }

    /// Create a new reader positioned at `position`.
    pub fn new_at(inner: &'a mut R, position: u64) -> Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        let mut reader = Self {
            inner,
            position: 0,
            len,
        };
        reader.seek(position)?;
        Ok(reader)
    }

    /// Get the current position in the source.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Get the total length of the source.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.position >= self.len
    }

    /// Seek to an absolute position. Positions past the end are rejected.
    pub fn seek(&mut self, position: u64) -> Result<()> {
        if position > self.len {
            return Err(Error::OutOfRange {
                offset: position,
                len: self.len,
            });
        }
        self.inner.seek(SeekFrom::Start(position))?;
        self.position = position;
        Ok(())
    }

    /// Skip `count` bytes forward.
    pub fn advance(&mut self, count: u64) -> Result<()> {
        let target = self.position.checked_add(count).ok_or(Error::OutOfRange {
            offset: u64::MAX,
            len: self.len,
        })?;
        self.seek(target)
    }

    /// Fill `buf` completely from the source.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.ensure(buf.len() as u64)?;
        self.inner.read_exact(buf)?;
        self.position += buf.len() as u64;
        Ok(())
    }

    /// Read exactly `count` bytes into a new buffer.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        self.ensure(count as u64)?;
        let mut bytes = vec![0u8; count];
        self.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    /// Append exactly `count` bytes to `buf`.
    pub fn read_append(&mut self, buf: &mut Vec<u8>, count: usize) -> Result<()> {
        self.ensure(count as u64)?;
        let start = buf.len();
        buf.resize(start + count, 0);
        self.read_exact(&mut buf[start..])
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let value = self.inner.read_u8()?;
        self.position += 1;
        Ok(value)
    }

    /// Read a little-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        let value = self.inner.read_u16::<LittleEndian>()?;
        self.position += 2;
        Ok(value)
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        let value = self.inner.read_u32::<LittleEndian>()?;
        self.position += 4;
        Ok(value)
    }

    /// Read a fixed-layout struct using zerocopy.
    ///
    /// The struct must implement `FromBytes` from the zerocopy crate.
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(&bytes).map_err(|_| Error::UnexpectedEof {
            needed: size as u64,
            available: bytes.len() as u64,
        })
    }

    /// Give back the borrowed source. Its cursor is left at [`position`](Self::position).
    #[inline]
    pub fn into_inner(self) -> &'a mut R {
        self.inner
    }

    #[inline]
    fn ensure(&self, needed: u64) -> Result<()> {
        let available = self.remaining();
        if available < needed {
            return Err(Error::UnexpectedEof { needed, available });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

    use super::*;

    #[test]
    fn test_read_primitives() {
        let mut source = Cursor::new(vec![
            0x01u8, 0x02, 0x03, 0x04, // u32: 0x04030201
            0xFF, 0xFF, // u16: 0xFFFF
            0x7F, // u8
        ]);
        let mut reader = StreamReader::new(&mut source).unwrap();

        assert_eq!(reader.len(), 7);
        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert_eq!(reader.read_u16().unwrap(), 0xFFFF);
        assert_eq!(reader.read_u8().unwrap(), 0x7F);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_short_read_is_detected() {
        let mut source = Cursor::new(vec![0x01, 0x02, 0x03]);
        let mut reader = StreamReader::new(&mut source).unwrap();

        match reader.read_u32() {
            Err(Error::UnexpectedEof { needed, available }) => {
                assert_eq!(needed, 4);
                assert_eq!(available, 3);
            }
            other => panic!("expected UnexpectedEof, got {:?}", other),
        }
        // A failed read does not move the cursor.
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_u16().unwrap(), 0x0201);
    }

    #[test]
    fn test_huge_length_does_not_allocate() {
        let mut source = Cursor::new(vec![0u8; 16]);
        let mut reader = StreamReader::new(&mut source).unwrap();

        assert!(matches!(
            reader.read_bytes(usize::MAX),
            Err(Error::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_seek_and_advance_bounds() {
        let mut source = Cursor::new(vec![0u8; 8]);
        let mut reader = StreamReader::new_at(&mut source, 4).unwrap();

        assert_eq!(reader.position(), 4);
        assert_eq!(reader.remaining(), 4);
        reader.advance(4).unwrap();
        assert!(reader.is_empty());
        assert!(matches!(
            reader.advance(1),
            Err(Error::OutOfRange { offset: 9, len: 8 })
        ));
        assert!(matches!(
            reader.advance(u64::MAX),
            Err(Error::OutOfRange { .. })
        ));
        assert!(StreamReader::new_at(&mut source, 9).is_err());
    }

    #[test]
    fn test_read_append() {
        let mut source = Cursor::new(b"abcdef".to_vec());
        let mut reader = StreamReader::new(&mut source).unwrap();
        let mut buf = b"xy".to_vec();

        reader.read_append(&mut buf, 3).unwrap();
        assert_eq!(buf, b"xyabc");
        assert!(reader.read_append(&mut buf, 4).is_err());
        assert_eq!(buf, b"xyabc");
    }

    #[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
    #[repr(C, packed)]
    struct Pair {
        a: u16,
        b: u32,
    }

    #[test]
    fn test_read_struct() {
        let pair = Pair { a: 7, b: 0xDEADBEEF };
        let mut source = Cursor::new(pair.as_bytes().to_vec());
        let mut reader = StreamReader::new(&mut source).unwrap();

        let read: Pair = reader.read_struct().unwrap();
        let (a, b) = (read.a, read.b);
        assert_eq!(a, 7);
        assert_eq!(b, 0xDEADBEEF);
        assert!(reader.read_struct::<Pair>().is_err());
    }

    #[test]
    fn test_into_inner_keeps_cursor() {
        let mut source = Cursor::new(vec![1u8, 2, 3, 4]);
        let mut reader = StreamReader::new_at(&mut source, 1).unwrap();
        reader.read_u8().unwrap();

        let inner = reader.into_inner();
        assert_eq!(inner.position(), 2);
    }
}
