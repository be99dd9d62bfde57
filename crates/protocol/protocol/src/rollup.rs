//! Rollup parameters consulted by the batch submitter.

/// The protocol limit on RLP bytes per channel.
pub const MAX_RLP_BYTES_PER_CHANNEL: u64 = 100_000_000;

/// The subset of the rollup configuration the batch submitter consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollupConfig {
    /// The maximum number of RLP bytes a single channel may carry.
    pub max_rlp_bytes_per_channel: u64,
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self { max_rlp_bytes_per_channel: MAX_RLP_BYTES_PER_CHANNEL }
    }
}
