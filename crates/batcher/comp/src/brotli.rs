//! Brotli compression for Fjord-style channels.

use crate::{ChannelCompressor, CompressorError, CompressorResult, CompressorWriter};
use brotli::enc::BrotliEncoderParams;

/// The window size used for channel brotli streams.
const BROTLI_LGWIN: i32 = 22;

/// The brotli quality levels permitted for channel data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BrotliLevel {
    /// Quality 9.
    Brotli9 = 9,
    /// Quality 10.
    #[default]
    Brotli10 = 10,
    /// Quality 11.
    Brotli11 = 11,
}

/// An error from brotli compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BrotliCompressionError {
    /// The encoder failed.
    #[error("brotli compression failed")]
    CompressionFailed,
}

/// One-shot brotli compression of `input` at the given quality.
pub fn compress_brotli(
    input: &[u8],
    level: BrotliLevel,
) -> Result<Vec<u8>, BrotliCompressionError> {
    let params = BrotliEncoderParams {
        quality: level as i32,
        lgwin: BROTLI_LGWIN,
        ..Default::default()
    };
    let mut output = Vec::new();
    brotli::BrotliCompress(&mut &input[..], &mut output, &params)
        .map_err(|_| BrotliCompressionError::CompressionFailed)?;
    Ok(output)
}

/// A buffering brotli compressor.
///
/// Brotli channels are emitted as a single stream, so input is buffered and
/// compressed when the stream is closed; until then no output is readable.
#[derive(Debug, Clone, Default)]
pub struct BrotliCompressor {
    /// The quality level.
    level: BrotliLevel,
    /// Buffered input awaiting compression.
    input: Vec<u8>,
    /// Compressed bytes not yet drained by reads.
    buf: Vec<u8>,
    /// Whether the stream has been finalized.
    closed: bool,
}

impl BrotliCompressor {
    /// Creates a new [`BrotliCompressor`] at the given quality.
    pub const fn new(level: BrotliLevel) -> Self {
        Self { level, input: Vec::new(), buf: Vec::new(), closed: false }
    }
}

impl CompressorWriter for BrotliCompressor {
    fn write(&mut self, data: &[u8]) -> CompressorResult<usize> {
        if self.closed {
            return Err(CompressorError::Closed);
        }
        self.input.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> CompressorResult<()> {
        // The stream only materializes at close.
        Ok(())
    }

    fn close(&mut self) -> CompressorResult<()> {
        if self.closed {
            return Err(CompressorError::Closed);
        }
        self.closed = true;
        self.buf = compress_brotli(&self.input, self.level)
            .map_err(|_| CompressorError::Compression)?;
        Ok(())
    }

    fn reset(&mut self) {
        self.input.clear();
        self.buf.clear();
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

impl ChannelCompressor for BrotliCompressor {
    fn is_full(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brotli::Decompressor;
    use std::io::Read;

    fn decompress(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        Decompressor::new(data, 4096).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_compress_brotli_roundtrip() {
        let data = b"fjord channel data fjord channel data";
        let compressed = compress_brotli(data, BrotliLevel::Brotli10).unwrap();
        assert_eq!(decompress(&compressed), data);
    }

    #[test]
    fn test_no_output_until_close() {
        let mut compressor = BrotliCompressor::new(BrotliLevel::Brotli9);
        compressor.write(&[1; 512]).unwrap();
        compressor.flush().unwrap();
        assert!(compressor.is_empty());

        compressor.close().unwrap();
        assert!(compressor.len() > 0);

        let mut out = vec![0u8; compressor.len()];
        compressor.read(&mut out).unwrap();
        assert_eq!(decompress(&out), vec![1; 512]);
    }

    #[test]
    fn test_write_after_close() {
        let mut compressor = BrotliCompressor::new(BrotliLevel::Brotli11);
        compressor.close().unwrap();
        assert_eq!(compressor.write(&[0]), Err(CompressorError::Closed));
    }
}
