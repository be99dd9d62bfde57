//! The channel frame type and its v0 wire encoding.

use alloc::vec::Vec;

/// The unique identifier of a channel.
pub type ChannelId = [u8; 16];

/// The encoding overhead of a v0 frame: 16-byte channel id, 2-byte frame
/// number, 4-byte data length, and the trailing `is_last` byte.
pub const FRAME_V0_OVERHEAD: usize = 23;

/// The version byte prefixed to batcher transaction payloads.
pub const DERIVATION_VERSION_0: u8 = 0;

/// A frame: a size-bounded slice of a channel's compressed output, the unit
/// of an L1 DA transaction payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Frame {
    /// The channel the frame belongs to.
    pub id: ChannelId,
    /// The index of the frame within its channel.
    pub number: u16,
    /// The frame payload.
    pub data: Vec<u8>,
    /// Whether this is the last frame of the channel.
    pub is_last: bool,
}

impl Frame {
    /// Encodes the frame into its v0 wire format.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size());
        out.extend_from_slice(&self.id);
        out.extend_from_slice(&self.number.to_be_bytes());
        out.extend_from_slice(&(self.data.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.data);
        out.push(self.is_last as u8);
        out
    }

    /// The encoded size of the frame, payload plus overhead.
    pub const fn size(&self) -> usize {
        self.data.len() + FRAME_V0_OVERHEAD
    }
}
