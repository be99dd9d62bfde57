//! The shadow-budgeted compressor.

use crate::{
    ChannelCompressor, Config, CompressorError, CompressorResult, CompressorWriter,
    VariantCompressor, ZlibCompressor,
};

/// Compressed bytes a zlib stream may still emit when finalized after a
/// sync flush: the final empty block plus the trailer.
const CLOSE_OVERHEAD_ZLIB: u64 = 9;

/// A compressor that bounds its *actual* compressed output size.
///
/// Every write is first compressed through a shadow zlib stream that is
/// kept sync-flushed; when the shadow stream's total output (plus the
/// worst-case close overhead) would exceed the target size, the write is
/// refused and the compressor latches full. The data delivered to the real
/// compressor therefore never produces more output than the target.
#[derive(Debug)]
pub struct ShadowCompressor {
    /// The compressor configuration.
    config: Config,
    /// The real compressor holding channel data.
    compressor: VariantCompressor,
    /// The shadow stream used only for size accounting.
    shadow: ZlibCompressor,
    /// Latched once a write would exceed the target size.
    full: bool,
}

impl ShadowCompressor {
    /// Creates a new [`ShadowCompressor`] around the given inner compressor.
    pub fn new(config: Config, compressor: VariantCompressor) -> Self {
        Self { config, compressor, shadow: ZlibCompressor::new(), full: false }
    }
}

impl From<Config> for ShadowCompressor {
    fn from(config: Config) -> Self {
        let compressor = VariantCompressor::from(config.compression_algo);
        Self::new(config, compressor)
    }
}

impl CompressorWriter for ShadowCompressor {
    fn write(&mut self, data: &[u8]) -> CompressorResult<usize> {
        if self.full {
            return Err(CompressorError::Full);
        }
        self.shadow.write(data)?;
        self.shadow.flush()?;
        if self.shadow.total_out() + CLOSE_OVERHEAD_ZLIB > self.config.target_output_size {
            self.full = true;
            return Err(CompressorError::Full);
        }
        self.compressor.write(data)
    }

    fn flush(&mut self) -> CompressorResult<()> {
        self.compressor.flush()
    }

    fn close(&mut self) -> CompressorResult<()> {
        self.compressor.close()
    }

    fn reset(&mut self) {
        self.compressor.reset();
        self.shadow.reset();
        self.full = false;
    }

    fn len(&self) -> usize {
        self.compressor.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> CompressorResult<usize> {
        self.compressor.read(buf)
    }
}

impl ChannelCompressor for ShadowCompressor {
    fn is_full(&self) -> bool {
        self.full
    }
}
