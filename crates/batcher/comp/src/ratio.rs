//! The ratio-budgeted compressor.

use crate::{
    ChannelCompressor, Config, CompressorError, CompressorResult, CompressorWriter,
    VariantCompressor,
};

/// A compressor that bounds its input by an assumed compression ratio.
///
/// The input budget is `target_output_size / approx_compr_ratio`: once that
/// many bytes have been accepted, the output is expected to have reached the
/// target size and further writes fail with [`CompressorError::Full`].
#[derive(Debug)]
pub struct RatioCompressor {
    /// The compressor configuration.
    config: Config,
    /// Input bytes accepted so far.
    lake: u64,
    /// The inner [`VariantCompressor`] doing the actual compression.
    compressor: VariantCompressor,
}

impl RatioCompressor {
    /// Creates a new [`RatioCompressor`] around the given inner compressor.
    pub const fn new(config: Config, compressor: VariantCompressor) -> Self {
        Self { config, lake: 0, compressor }
    }

    /// The input budget in bytes implied by the configured target size and
    /// assumed ratio.
    pub fn input_threshold(&self) -> usize {
        (self.config.target_output_size as f64 / self.config.approx_compr_ratio) as usize
    }
}

impl From<Config> for RatioCompressor {
    fn from(config: Config) -> Self {
        let compressor = VariantCompressor::from(config.compression_algo);
        Self::new(config, compressor)
    }
}

impl CompressorWriter for RatioCompressor {
    fn write(&mut self, data: &[u8]) -> CompressorResult<usize> {
        if self.is_full() {
            return Err(CompressorError::Full);
        }
        let n = self.compressor.write(data)?;
        self.lake += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> CompressorResult<()> {
        self.compressor.flush()
    }

    fn close(&mut self) -> CompressorResult<()> {
        self.compressor.close()
    }

    fn reset(&mut self) {
        self.compressor.reset();
        self.lake = 0;
    }

    fn len(&self) -> usize {
        self.compressor.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> CompressorResult<usize> {
        self.compressor.read(buf)
    }
}

impl ChannelCompressor for RatioCompressor {
    fn is_full(&self) -> bool {
        self.lake >= self.input_threshold() as u64
    }
}
