//! Decompression utilities for container payloads.

use std::fmt;

use flate2::{Decompress, FlushDecompress, Status};
use log::warn;

/// Why a deflate stream could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecFailure {
    /// The stream asks for a preset dictionary.
    NeedsDictionary,
    /// The stream is corrupt.
    DataError,
    /// The output buffer could not be allocated.
    OutOfMemory,
}

impl fmt::Display for CodecFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NeedsDictionary => "stream requires a preset dictionary",
            Self::DataError => "corrupt deflate data",
            Self::OutOfMemory => "could not allocate output buffer",
        })
    }
}

/// Decode raw DEFLATE data (no zlib header or trailer) into a buffer of
/// exactly `uncompressed_size` bytes.
///
/// Decoding is a single finishing call. Running out of output space before
/// the end marker is not an error: the buffer is returned at its declared
/// size and a warning is logged.
pub fn inflate_raw(input: &[u8], uncompressed_size: usize) -> Result<Vec<u8>, CodecFailure> {
    if uncompressed_size == 0 {
        return Ok(Vec::new());
    }

    let mut output = Vec::new();
    output
        .try_reserve_exact(uncompressed_size)
        .map_err(|_| CodecFailure::OutOfMemory)?;
    output.resize(uncompressed_size, 0);

    let mut decoder = Decompress::new(false);
    match decoder.decompress(input, &mut output, FlushDecompress::Finish) {
        Ok(Status::StreamEnd) => {}
        Ok(status) => warn!(
            "deflate stream unfinished ({:?}): consumed {} of {} input bytes, produced {} of {} output bytes",
            status,
            decoder.total_in(),
            input.len(),
            decoder.total_out(),
            uncompressed_size
        ),
        Err(e) if e.needs_dictionary().is_some() => return Err(CodecFailure::NeedsDictionary),
        Err(_) => return Err(CodecFailure::DataError),
    }

    Ok(output)
}
