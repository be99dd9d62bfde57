//! Compressor configuration.

use crate::{CompressionAlgo, CompressorType};

/// Configuration for a channel's budgeted compressor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// The target number of compressed output bytes for the channel.
    pub target_output_size: u64,
    /// The compression ratio assumed when estimating the input budget.
    pub approx_compr_ratio: f64,
    /// The compression algorithm to apply.
    pub compression_algo: CompressionAlgo,
    /// The budgeting strategy.
    pub kind: CompressorType,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_output_size: 100_000,
            approx_compr_ratio: 0.4,
            compression_algo: CompressionAlgo::Zlib,
            kind: CompressorType::Ratio,
        }
    }
}
