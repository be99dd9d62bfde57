//! Streaming zlib compression backed by `miniz_oxide`.

use crate::{ChannelCompressor, CompressorError, CompressorResult, CompressorWriter};
use alloc::{boxed::Box, vec::Vec};
use core::fmt;
use miniz_oxide::{
    MZError, MZFlush, MZStatus,
    deflate::{
        compress_to_vec_zlib,
        core::{CompressorOxide, create_comp_flags_from_zip_params},
        stream::deflate,
    },
    inflate::decompress_to_vec_zlib,
};

/// The zlib compression level used for channel data.
pub const ZLIB_COMPRESSION_LEVEL: i32 = 9;

/// Window bits for the zlib container format.
const ZLIB_WINDOW_BITS: i32 = 15;

/// Output chunk size used when driving the deflate stream.
const OUT_CHUNK: usize = 4096;

/// One-shot zlib compression of `data`.
pub fn compress_zlib(data: &[u8]) -> Vec<u8> {
    compress_to_vec_zlib(data, ZLIB_COMPRESSION_LEVEL as u8)
}

/// One-shot zlib decompression of `data`.
pub fn decompress_zlib(data: &[u8]) -> CompressorResult<Vec<u8>> {
    decompress_to_vec_zlib(data).map_err(|_| CompressorError::Compression)
}

/// A streaming zlib compressor.
///
/// Input is deflated as it is written, so compressed bytes become readable
/// while the stream is still open; [`CompressorWriter::close`] finalizes
/// the stream with the zlib trailer.
pub struct ZlibCompressor {
    /// The deflate stream state.
    inner: Box<CompressorOxide>,
    /// Flags the stream state was created with, kept for reset.
    flags: u32,
    /// Compressed bytes not yet drained by reads.
    buf: Vec<u8>,
    /// Total compressed bytes produced, including drained ones.
    total_out: u64,
    /// Whether the stream has been finalized.
    closed: bool,
}

impl ZlibCompressor {
    /// Creates a new, empty [`ZlibCompressor`].
    pub fn new() -> Self {
        let flags =
            create_comp_flags_from_zip_params(ZLIB_COMPRESSION_LEVEL, ZLIB_WINDOW_BITS, 0);
        Self {
            inner: Box::new(CompressorOxide::new(flags)),
            flags,
            buf: Vec::new(),
            total_out: 0,
            closed: false,
        }
    }

    /// Total compressed bytes the stream has produced so far, including
    /// bytes already drained by reads.
    pub const fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Drives the deflate stream over `input` with the given flush mode,
    /// collecting all produced output.
    fn drive(&mut self, mut input: &[u8], flush: MZFlush) -> CompressorResult<()> {
        let mut chunk = [0u8; OUT_CHUNK];
        loop {
            let res = deflate(&mut self.inner, input, &mut chunk, flush);
            self.buf.extend_from_slice(&chunk[..res.bytes_written]);
            self.total_out += res.bytes_written as u64;
            input = &input[res.bytes_consumed..];
            match res.status {
                Ok(MZStatus::StreamEnd) => return Ok(()),
                Ok(_) => {
                    // With a finishing flush, keep going until the stream
                    // ends; otherwise stop once all input is consumed and
                    // the output chunk was not filled.
                    if input.is_empty()
                        && res.bytes_written < chunk.len()
                        && flush != MZFlush::Finish
                    {
                        return Ok(());
                    }
                }
                Err(MZError::Buf) if input.is_empty() => return Ok(()),
                Err(_) => return Err(CompressorError::Compression),
            }
        }
    }
}

impl Default for ZlibCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ZlibCompressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZlibCompressor")
            .field("ready", &self.buf.len())
            .field("total_out", &self.total_out)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl CompressorWriter for ZlibCompressor {
    fn write(&mut self, data: &[u8]) -> CompressorResult<usize> {
        if self.closed {
            return Err(CompressorError::Closed);
        }
        self.drive(data, MZFlush::None)?;
        Ok(data.len())
    }

    fn flush(&mut self) -> CompressorResult<()> {
        if self.closed {
            return Ok(());
        }
        self.drive(&[], MZFlush::Sync)
    }

    fn close(&mut self) -> CompressorResult<()> {
        if self.closed {
            return Err(CompressorError::Closed);
        }
        self.closed = true;
        self.drive(&[], MZFlush::Finish)
    }

    fn reset(&mut self) {
        self.inner = Box::new(CompressorOxide::new(self.flags));
        self.buf.clear();
        self.total_out = 0;
        self.closed = false;
    }

    fn len(&self) -> usize {
        self.buf.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> CompressorResult<usize> {
        let n = self.buf.len().min(buf.len());
        buf[..n].copy_from_slice(&self.buf[..n]);
        self.buf.drain(..n);
        Ok(n)
    }
}

impl ChannelCompressor for ZlibCompressor {
    fn is_full(&self) -> bool {
        false
    }
}
