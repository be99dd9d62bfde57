//! Channel configuration and its provider interface.

use hoist_comp::{CompressionAlgo, CompressorType, Config as CompressorConfig};
use hoist_protocol::BatchType;

/// The configuration a channel is bound to for its whole lifetime.
///
/// Reconfiguration never touches an existing channel: the manager only
/// consults the provider again when deciding whether to rebuild a channel
/// that has not leaked any bytes to L1 yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelConfig {
    /// Whether frames are carried as blobs rather than calldata.
    pub use_blobs: bool,
    /// The batch type handed to the codec.
    pub batch_type: BatchType,
    /// The compression algorithm handed to the codec.
    pub compression_algo: CompressionAlgo,
    /// The codec's output-budgeting strategy.
    pub compressor_kind: CompressorType,
    /// The compression ratio assumed by ratio budgeting.
    pub approx_compr_ratio: f64,
    /// The number of frames a channel targets before closing.
    pub target_num_frames: u64,
    /// The maximum encoded size of a single frame, overhead included.
    pub max_frame_size: u64,
    /// The number of L1 blocks after which an open channel is closed.
    /// Zero disables the duration timeout.
    pub max_channel_duration: u64,
    /// Safety buffer subtracted from the inclusion deadline of a channel's
    /// frames.
    pub sub_safety_margin: u64,
}

impl ChannelConfig {
    /// A calldata-channel configuration.
    pub const fn calldata() -> Self {
        Self {
            use_blobs: false,
            batch_type: BatchType::Single,
            compression_algo: CompressionAlgo::Zlib,
            compressor_kind: CompressorType::Ratio,
            approx_compr_ratio: 0.4,
            target_num_frames: 1,
            max_frame_size: 120_000,
            max_channel_duration: 150,
            sub_safety_margin: 10,
        }
    }

    /// A blob-channel configuration.
    pub const fn blobs() -> Self {
        Self {
            use_blobs: true,
            target_num_frames: 6,
            max_frame_size: 130_044,
            ..Self::calldata()
        }
    }

    /// The compressor configuration implied by the frame budget.
    pub(crate) fn compressor_config(&self) -> CompressorConfig {
        CompressorConfig {
            target_output_size: self.max_frame_size.saturating_mul(self.target_num_frames),
            approx_compr_ratio: self.approx_compr_ratio,
            compression_algo: self.compression_algo,
            kind: self.compressor_kind,
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::calldata()
    }
}

/// Yields the currently preferred [`ChannelConfig`].
///
/// Consulted at channel creation and at every dispatch that reaches the
/// reconfiguration decision point; must be deterministic within one call.
pub trait ChannelConfigProvider: Send + Sync + core::fmt::Debug {
    /// Returns the currently preferred configuration.
    fn channel_config(&self) -> ChannelConfig;
}

/// A fixed configuration is its own provider.
impl ChannelConfigProvider for ChannelConfig {
    fn channel_config(&self) -> ChannelConfig {
        *self
    }
}
