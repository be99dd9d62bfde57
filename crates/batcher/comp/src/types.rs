//! Shared compression types.

/// A result type alias for compressor operations.
pub type CompressorResult<T> = Result<T, CompressorError>;

/// An error produced by a compressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CompressorError {
    /// The compressor has reached its configured budget and accepts no more
    /// input.
    #[error("The compressor is full")]
    Full,
    /// The compressor has been closed; no further input may be written.
    #[error("The compressor is closed")]
    Closed,
    /// The underlying compression routine failed.
    #[error("Compression failure")]
    Compression,
}

/// The compression algorithm applied to a channel's batch data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CompressionAlgo {
    /// ZLIB, the pre-Fjord channel compression.
    #[default]
    Zlib,
    /// Brotli at quality 9.
    Brotli9,
    /// Brotli at quality 10.
    Brotli10,
    /// Brotli at quality 11.
    Brotli11,
}

impl CompressionAlgo {
    /// Whether the algorithm is a brotli variant.
    pub const fn is_brotli(&self) -> bool {
        !matches!(self, Self::Zlib)
    }
}

/// The strategy used to bound a channel's compressed output size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CompressorType {
    /// Estimate the input budget from an assumed compression ratio.
    #[default]
    Ratio,
    /// Bound the actual compressed size by shadowing writes through a
    /// second compression stream.
    Shadow,
}
