//! Error taxonomy of the batcher core.

use alloy_primitives::hex;
use hoist_comp::{ChannelOutError, CompressorError};
use hoist_protocol::{BatchType, ChannelId};

/// The reason a channel stopped accepting blocks.
///
/// A full channel never reopens; the reason is latched by the builder and
/// preserved for logging and closure accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ChannelFullError {
    /// The compressor reached its configured output budget.
    #[error("compressor budget reached")]
    CompressorFull,
    /// The channel reached the protocol limit on RLP bytes.
    #[error("max RLP bytes per channel reached")]
    MaxRlpBytesReached,
    /// The channel emitted its full frame budget.
    #[error("max frames per channel reached")]
    MaxFramesReached,
    /// The channel was open for longer than the configured duration.
    #[error("max channel duration reached")]
    DurationTimeout,
    /// The codec refused further input because its stream is finalized.
    #[error("channel terminated")]
    Terminated,
}

/// An error from building a channel out of blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ChannelBuilderError {
    /// The channel is full and accepts no more blocks. The offending block
    /// is not consumed.
    #[error("channel is full: {0}")]
    Full(ChannelFullError),
    /// A codec-internal failure. Fatal to the current call.
    #[error("channel out error: {0}")]
    ChannelOut(ChannelOutError),
}

impl From<ChannelOutError> for ChannelBuilderError {
    fn from(err: ChannelOutError) -> Self {
        match err {
            ChannelOutError::Compression(CompressorError::Full) => {
                Self::Full(ChannelFullError::CompressorFull)
            }
            ChannelOutError::ExceedsMaxRlpBytesPerChannel => {
                Self::Full(ChannelFullError::MaxRlpBytesReached)
            }
            ChannelOutError::ChannelClosed => Self::Full(ChannelFullError::Terminated),
            err => Self::ChannelOut(err),
        }
    }
}

impl From<ChannelFullError> for ChannelBuilderError {
    fn from(err: ChannelFullError) -> Self {
        Self::Full(err)
    }
}

/// An error from the channel manager's public surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelManagerError {
    /// No tx data is currently producible. This is a sentinel, not a
    /// failure: the caller simply has nothing to submit right now.
    #[error("no tx data available")]
    NoTxData,
    /// The added block does not extend the current tip. The caller is
    /// expected to [`clear`](crate::ChannelManager::clear) and re-feed.
    #[error("block does not extend existing chain")]
    Reorg,
    /// Pending blocks or channels remain at shutdown. Reserved for the
    /// caller's shutdown path.
    #[error("pending data remains after close")]
    PendingAfterClose,
    /// The codec factory does not support the configured batch type.
    #[error("unsupported batch type: {0:?}")]
    UnsupportedBatchType(BatchType),
    /// A fully submitted, non-timed-out channel passed its inclusion
    /// deadline without the remote node advancing its safe head over it.
    #[error("safe head did not progress past fully submitted channel {}", hex::encode(.0))]
    MissingExpectedProgress(ChannelId),
    /// An error from channel building.
    #[error(transparent)]
    Builder(#[from] ChannelBuilderError),
}

impl ChannelManagerError {
    /// Whether this is the [`NoTxData`](Self::NoTxData) sentinel.
    pub const fn is_no_tx_data(&self) -> bool {
        matches!(self, Self::NoTxData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_errors_map_from_codec() {
        assert_eq!(
            ChannelBuilderError::from(ChannelOutError::Compression(CompressorError::Full)),
            ChannelBuilderError::Full(ChannelFullError::CompressorFull)
        );
        assert_eq!(
            ChannelBuilderError::from(ChannelOutError::ExceedsMaxRlpBytesPerChannel),
            ChannelBuilderError::Full(ChannelFullError::MaxRlpBytesReached)
        );
        assert_eq!(
            ChannelBuilderError::from(ChannelOutError::ChannelClosed),
            ChannelBuilderError::Full(ChannelFullError::Terminated)
        );
    }

    #[test]
    fn test_fatal_codec_errors_stay_fatal() {
        assert_eq!(
            ChannelBuilderError::from(ChannelOutError::MaxFrameSizeTooSmall),
            ChannelBuilderError::ChannelOut(ChannelOutError::MaxFrameSizeTooSmall)
        );
    }

    #[test]
    fn test_no_tx_data_sentinel() {
        assert!(ChannelManagerError::NoTxData.is_no_tx_data());
        assert!(!ChannelManagerError::Reorg.is_no_tx_data());
    }
}
