//! Transaction identifiers and payloads handed to the L1 tx manager.

use alloy_primitives::{Bytes, hex};
use core::fmt;
use hoist_protocol::{ChannelId, DERIVATION_VERSION_0, Frame};

/// Identifies one submission attempt of one frame.
///
/// Every dispatch mints a fresh id, so a frame that fails and is re-sent is
/// tracked under a new id; ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxId {
    /// The channel the frame belongs to.
    channel: ChannelId,
    /// The frame number within the channel.
    frame_number: u16,
    /// The dispatch attempt counter of the channel when the id was minted.
    attempt: u32,
}

impl TxId {
    /// Creates a new [`TxId`].
    pub const fn new(channel: ChannelId, frame_number: u16, attempt: u32) -> Self {
        Self { channel, frame_number, attempt }
    }

    /// The channel the frame belongs to.
    pub const fn channel(&self) -> ChannelId {
        self.channel
    }

    /// The frame number within the channel.
    pub const fn frame_number(&self) -> u16 {
        self.frame_number
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", hex::encode(self.channel), self.frame_number, self.attempt)
    }
}

/// One frame's worth of DA transaction payload, tagged with its [`TxId`]
/// and the modality the channel was built under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxData {
    /// The id minted for this dispatch.
    id: TxId,
    /// The frame being submitted.
    frame: Frame,
    /// Whether the frame is destined for a blob rather than calldata.
    use_blobs: bool,
}

impl TxData {
    /// Creates a new [`TxData`].
    pub(crate) const fn new(id: TxId, frame: Frame, use_blobs: bool) -> Self {
        Self { id, frame, use_blobs }
    }

    /// The id minted for this dispatch.
    pub const fn id(&self) -> TxId {
        self.id
    }

    /// The frame being submitted.
    pub const fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Whether the frame is destined for a blob rather than calldata.
    pub const fn use_blobs(&self) -> bool {
        self.use_blobs
    }

    /// The version-prefixed payload for a calldata transaction.
    pub fn call_data(&self) -> Bytes {
        let encoded = self.frame.encode();
        let mut out = Vec::with_capacity(1 + encoded.len());
        out.push(DERIVATION_VERSION_0);
        out.extend_from_slice(&encoded);
        Bytes::from(out)
    }
}
