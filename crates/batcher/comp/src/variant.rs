//! Algorithm dispatch over the channel compressors.

use crate::{
    BrotliCompressor, BrotliLevel, ChannelCompressor, CompressionAlgo, CompressorResult,
    CompressorWriter, ZlibCompressor,
};

/// A compressor dispatching to the algorithm a channel was configured with.
#[derive(Debug)]
pub enum VariantCompressor {
    /// Streaming zlib.
    Zlib(ZlibCompressor),
    /// Buffered brotli.
    Brotli(BrotliCompressor),
}

impl From<CompressionAlgo> for VariantCompressor {
    fn from(algo: CompressionAlgo) -> Self {
        match algo {
            CompressionAlgo::Zlib => Self::Zlib(ZlibCompressor::new()),
            CompressionAlgo::Brotli9 => Self::Brotli(BrotliCompressor::new(BrotliLevel::Brotli9)),
            CompressionAlgo::Brotli10 => {
                Self::Brotli(BrotliCompressor::new(BrotliLevel::Brotli10))
            }
            CompressionAlgo::Brotli11 => {
                Self::Brotli(BrotliCompressor::new(BrotliLevel::Brotli11))
            }
        }
    }
}

impl CompressorWriter for VariantCompressor {
    fn write(&mut self, data: &[u8]) -> CompressorResult<usize> {
        match self {
            Self::Zlib(c) => c.write(data),
            Self::Brotli(c) => c.write(data),
        }
    }

    fn flush(&mut self) -> CompressorResult<()> {
        match self {
            Self::Zlib(c) => c.flush(),
            Self::Brotli(c) => c.flush(),
        }
    }

    fn close(&mut self) -> CompressorResult<()> {
        match self {
            Self::Zlib(c) => c.close(),
            Self::Brotli(c) => c.close(),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Zlib(c) => c.reset(),
            Self::Brotli(c) => c.reset(),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Zlib(c) => c.len(),
            Self::Brotli(c) => c.len(),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> CompressorResult<usize> {
        match self {
            Self::Zlib(c) => c.read(buf),
            Self::Brotli(c) => c.read(buf),
        }
    }
}

impl ChannelCompressor for VariantCompressor {
    fn is_full(&self) -> bool {
        match self {
            Self::Zlib(c) => c.is_full(),
            Self::Brotli(c) => c.is_full(),
        }
    }
}
