//! The remote rollup node's view of chain safety.

use crate::{BlockInfo, L2BlockInfo};

/// A snapshot of the remote rollup node's sync progress, as reported over
/// its RPC. Only the fields the batch submitter consumes are carried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyncStatus {
    /// The L1 block the node has most recently processed.
    pub current_l1: BlockInfo,
    /// The highest L2 block the node derived from finalized-enough L1 data.
    pub safe_l2: L2BlockInfo,
    /// The head of the unsafe L2 chain.
    pub unsafe_l2: L2BlockInfo,
}

#[cfg(test)]
#[cfg(feature = "serde")]
mod tests {
    use super::*;

    #[test]
    fn test_sync_status_serde_roundtrip() {
        let status = SyncStatus {
            current_l1: BlockInfo { number: 100, ..Default::default() },
            ..Default::default()
        };
        let raw = serde_json::to_string(&status).unwrap();
        assert_eq!(serde_json::from_str::<SyncStatus>(&raw).unwrap(), status);
    }
}
