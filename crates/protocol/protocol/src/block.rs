//! Block reference types for the L2 chain and its L1 origins.

use alloc::vec::Vec;
use alloy_eips::BlockNumHash;
use alloy_primitives::{B256, Bytes};

use crate::SingleBatch;

/// Approximate per-block overhead, in bytes, of a block's batch encoding on
/// top of its raw transaction payloads. Used for DA-size estimation only.
const APPROX_BATCH_OVERHEAD: u64 = 70;

/// Header information of a block, L1 or L2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::Display)]
#[display("BlockInfo {{ hash: {hash}, number: {number}, timestamp: {timestamp} }}")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct BlockInfo {
    /// The block hash.
    pub hash: B256,
    /// The block number.
    pub number: u64,
    /// The parent block hash.
    pub parent_hash: B256,
    /// The block timestamp.
    pub timestamp: u64,
}

impl BlockInfo {
    /// Creates a new [`BlockInfo`].
    pub const fn new(hash: B256, number: u64, parent_hash: B256, timestamp: u64) -> Self {
        Self { hash, number, parent_hash, timestamp }
    }

    /// Returns the `(hash, number)` pair identifying this block.
    pub const fn id(&self) -> BlockNumHash {
        BlockNumHash { hash: self.hash, number: self.number }
    }
}

/// An L2 block reference: header information plus the L1 origin the block
/// was derived against and its position within that origin's epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::Display)]
#[display("L2BlockInfo {{ {}, l1_origin: {}, seq_num: {} }}", block_info, l1_origin.number, seq_num)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct L2BlockInfo {
    /// The block header info.
    pub block_info: BlockInfo,
    /// The L1 origin the block was derived against.
    pub l1_origin: BlockNumHash,
    /// The sequence number of the block within its epoch.
    pub seq_num: u64,
}

impl L2BlockInfo {
    /// Creates a new [`L2BlockInfo`].
    pub const fn new(block_info: BlockInfo, l1_origin: BlockNumHash, seq_num: u64) -> Self {
        Self { block_info, l1_origin, seq_num }
    }

    /// Returns the `(hash, number)` pair identifying this block.
    pub const fn id(&self) -> BlockNumHash {
        self.block_info.id()
    }
}

/// An L2 block as consumed by the batch submitter: its reference info plus
/// the raw, already-encoded user transactions it carries.
///
/// Deposit transactions are derived from L1 and never posted back, so they
/// are excluded by the block source before the block reaches this type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct L2Block {
    /// Reference info for the block.
    pub info: L2BlockInfo,
    /// The raw encoded user transactions of the block.
    pub transactions: Vec<Bytes>,
}

impl L2Block {
    /// Creates a new [`L2Block`].
    pub const fn new(info: L2BlockInfo, transactions: Vec<Bytes>) -> Self {
        Self { info, transactions }
    }

    /// The block hash.
    pub const fn hash(&self) -> B256 {
        self.info.block_info.hash
    }

    /// The block number.
    pub const fn number(&self) -> u64 {
        self.info.block_info.number
    }

    /// The parent block hash.
    pub const fn parent_hash(&self) -> B256 {
        self.info.block_info.parent_hash
    }

    /// Converts the block into the [`SingleBatch`] that carries it on L1.
    pub fn single_batch(&self) -> SingleBatch {
        SingleBatch {
            parent_hash: self.info.block_info.parent_hash,
            epoch_num: self.info.l1_origin.number,
            epoch_hash: self.info.l1_origin.hash,
            timestamp: self.info.block_info.timestamp,
            transactions: self.transactions.clone(),
        }
    }

    /// Estimates the number of DA bytes this block will occupy once batched,
    /// before compression.
    pub fn estimated_da_size(&self) -> u64 {
        self.transactions.iter().map(|tx| tx.len() as u64).sum::<u64>() + APPROX_BATCH_OVERHEAD
    }
}
