//! Batch types: the versioned envelope and the singular batch payload.

use alloc::vec::Vec;
use alloy_eips::BlockNumHash;
use alloy_primitives::{B256, Bytes};
use alloy_rlp::{Decodable, Encodable, RlpDecodable, RlpEncodable};

/// The type of batch carried by a channel, encoded as the leading byte of
/// the batch envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BatchType {
    /// A singular batch: one L2 block per batch.
    #[default]
    Single = 0,
    /// A span batch: a compact range of L2 blocks per batch.
    Span = 1,
}

/// An error decoding a [`SingleBatch`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchDecodingError {
    /// The buffer is empty.
    #[error("batch buffer is empty")]
    Empty,
    /// The leading batch-type byte is not a supported batch type.
    #[error("unsupported batch type: {0}")]
    UnsupportedBatchType(u8),
    /// The RLP payload is malformed.
    #[error("batch RLP error: {0}")]
    Rlp(alloy_rlp::Error),
}

/// A singular batch: the submission form of one L2 block.
#[derive(Debug, Clone, Default, PartialEq, Eq, RlpEncodable, RlpDecodable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct SingleBatch {
    /// The parent hash of the batched block.
    pub parent_hash: B256,
    /// The number of the L1 origin epoch.
    pub epoch_num: u64,
    /// The hash of the L1 origin epoch.
    pub epoch_hash: B256,
    /// The timestamp of the batched block.
    pub timestamp: u64,
    /// The raw encoded user transactions of the batched block.
    pub transactions: Vec<Bytes>,
}

impl SingleBatch {
    /// Encodes the batch into its versioned envelope: the batch-type byte
    /// followed by the RLP payload.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(BatchType::Single as u8);
        Encodable::encode(self, out);
    }

    /// Decodes a versioned batch envelope.
    pub fn decode(buf: &[u8]) -> Result<Self, BatchDecodingError> {
        let (version, mut payload) = buf.split_first().ok_or(BatchDecodingError::Empty)?;
        if *version != BatchType::Single as u8 {
            return Err(BatchDecodingError::UnsupportedBatchType(*version));
        }
        Decodable::decode(&mut payload).map_err(BatchDecodingError::Rlp)
    }

    /// Returns the `(hash, number)` pair of the batch's L1 origin epoch.
    pub const fn epoch(&self) -> BlockNumHash {
        BlockNumHash { hash: self.epoch_hash, number: self.epoch_num }
    }
}
