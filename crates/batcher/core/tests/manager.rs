//! Integration tests driving the channel manager through its public
//! surface, with the real codec underneath.

use alloy_eips::BlockNumHash;
use alloy_primitives::{B256, Bytes};
use alloy_rlp::Decodable;
use hoist_batcher::{
    ChannelConfig, ChannelConfigProvider, ChannelManager, ChannelManagerError, TxData,
};
use hoist_comp::{CompressorType, decompress_zlib};
use hoist_protocol::{BlockInfo, L2Block, L2BlockInfo, RollupConfig, SingleBatch, SyncStatus};
use rand::{RngCore, SeedableRng, rngs::SmallRng};
use rstest::*;
use std::sync::{Arc, Mutex};

/// Deterministic hash for L2 block `number`.
fn block_hash(number: u64) -> B256 {
    let mut out = [0u8; 32];
    out[0] = 0xb1;
    out[24..].copy_from_slice(&number.to_be_bytes());
    B256::from(out)
}

/// Deterministic L1 origin for L2 block `number`.
fn l1_origin(number: u64) -> BlockNumHash {
    let origin_number = number / 4 + 90;
    let mut out = [0u8; 32];
    out[0] = 0x11;
    out[24..].copy_from_slice(&origin_number.to_be_bytes());
    BlockNumHash { hash: B256::from(out), number: origin_number }
}

/// Builds `count` parent-linked blocks starting at `start_number`, each
/// carrying one transaction of `tx_bytes` incompressible bytes.
fn block_chain(start_number: u64, count: u64, tx_bytes: usize) -> Vec<L2Block> {
    (0..count)
        .map(|i| {
            let number = start_number + i;
            let mut rng = SmallRng::seed_from_u64(number ^ 0x5eed);
            let mut data = vec![0u8; tx_bytes];
            rng.fill_bytes(&mut data);
            let info = L2BlockInfo::new(
                BlockInfo::new(
                    block_hash(number),
                    number,
                    block_hash(number - 1),
                    1_700_000_000 + number * 2,
                ),
                l1_origin(number),
                number % 4,
            );
            L2Block::new(info, vec![Bytes::from(data)])
        })
        .collect()
}

/// A configuration that closes channels through an input-size budget of
/// `budget` bytes (assumed ratio 1.0, single-frame target of the same
/// size), with a far-off duration backstop.
fn size_bounded_config(budget: u64) -> ChannelConfig {
    ChannelConfig {
        approx_compr_ratio: 1.0,
        target_num_frames: 1,
        max_frame_size: budget,
        max_channel_duration: 100,
        sub_safety_margin: 0,
        ..Default::default()
    }
}

/// A config provider whose value can be swapped mid-test.
#[derive(Debug)]
struct FlipProvider(Mutex<ChannelConfig>);

impl FlipProvider {
    fn flip_blobs(&self) {
        let mut cfg = self.0.lock().unwrap();
        cfg.use_blobs = !cfg.use_blobs;
    }
}

impl ChannelConfigProvider for FlipProvider {
    fn channel_config(&self) -> ChannelConfig {
        *self.0.lock().unwrap()
    }
}

/// A manager over the given config, cleared to an L1-origin watermark of
/// block 98 (so duration timeouts are measured from there).
fn manager_with(cfg: ChannelConfig) -> (Arc<FlipProvider>, ChannelManager) {
    let provider = Arc::new(FlipProvider(Mutex::new(cfg)));
    let manager = ChannelManager::new(Arc::new(RollupConfig::default()), provider.clone());
    manager.clear(BlockNumHash { number: 98, hash: B256::ZERO });
    (provider, manager)
}

fn l1_head(number: u64) -> BlockInfo {
    BlockInfo { number, ..Default::default() }
}

fn inclusion(number: u64) -> BlockNumHash {
    BlockNumHash { number, hash: B256::with_last_byte(0x1c) }
}

/// Drains all currently producible tx data, confirming each transaction at
/// `inclusion_block`.
fn drain_confirming(
    manager: &ChannelManager,
    l1: BlockInfo,
    inclusion_block: BlockNumHash,
) -> Vec<TxData> {
    let mut out = Vec::new();
    loop {
        match manager.tx_data(l1) {
            Ok(txd) => {
                manager.tx_confirmed(&txd.id(), inclusion_block);
                out.push(txd);
            }
            Err(err) if err.is_no_tx_data() => return out,
            Err(err) => panic!("unexpected error: {err}"),
        }
    }
}

#[rstest]
fn test_blocks_flow_to_frames_and_drain() {
    let (_, manager) = manager_with(size_bounded_config(300));
    let blocks = block_chain(10, 3, 200);
    for block in &blocks {
        manager.add_l2_block(block.clone()).unwrap();
    }

    let first = manager.tx_data(l1_head(100)).unwrap();
    manager.tx_confirmed(&first.id(), inclusion(101));

    let mut txs = vec![first];
    txs.extend(drain_confirming(&manager, l1_head(100), inclusion(101)));
    assert!(manager.tx_data(l1_head(100)).unwrap_err().is_no_tx_data());

    // Reassemble the closed channel and check it carries blocks 10 and 11
    // (block 12 exceeded the input budget and stayed pending).
    let channel_id = txs[0].frame().id;
    let mut frames: Vec<_> = txs.iter().map(TxData::frame).filter(|f| f.id == channel_id).collect();
    frames.sort_by_key(|f| f.number);
    assert!(frames.last().unwrap().is_last);
    let payload: Vec<u8> = frames.iter().flat_map(|f| f.data.iter().copied()).collect();

    let raw = decompress_zlib(&payload).unwrap();
    let mut rest = raw.as_slice();
    let mut batches = Vec::new();
    while !rest.is_empty() {
        assert_eq!(rest[0], 0, "singular batch version byte");
        rest = &rest[1..];
        batches.push(<SingleBatch as Decodable>::decode(&mut rest).unwrap());
    }
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0], blocks[0].single_batch());
    assert_eq!(batches[1], blocks[1].single_batch());

    // Round-trip prune laws: a safe head at the latest queued block empties
    // both queues.
    manager.prune_channels(blocks[2].info);
    manager.prune_safe_blocks(blocks[2].info);
    let status = manager.status();
    assert_eq!(status.channels, 0);
    assert_eq!(status.blocks, 0);
    assert_eq!(status.block_cursor, 0);
}

#[rstest]
fn test_failed_tx_reemits_same_frame_under_fresh_id() {
    let cfg = ChannelConfig { max_channel_duration: 1, ..size_bounded_config(10_000) };
    let (_, manager) = manager_with(cfg);
    manager.add_l2_block(block_chain(10, 1, 200).remove(0)).unwrap();

    // The duration timeout (open at 98, head at 100) closes the channel.
    let first = manager.tx_data(l1_head(100)).unwrap();
    assert!(first.frame().is_last);

    manager.tx_failed(&first.id());
    let retry = manager.tx_data(l1_head(100)).unwrap();
    assert_eq!(retry.frame(), first.frame());
    assert_ne!(retry.id(), first.id());
    assert_eq!(retry.call_data(), first.call_data());
}

#[rstest]
fn test_modality_flip_rebuilds_unsubmitted_channel() {
    let (provider, manager) = manager_with(size_bounded_config(300));
    for block in block_chain(10, 6, 200) {
        manager.add_l2_block(block).unwrap();
    }

    provider.flip_blobs();
    let txd = manager.tx_data(l1_head(100)).unwrap();
    assert!(txd.use_blobs());

    // The calldata channel built on entry was invalidated before anything
    // was dispatched: the cursor rewound to block 10 and exactly one
    // (rebuilt) channel remains, holding blocks 10 and 11 again.
    let status = manager.status();
    assert_eq!(status.channels, 1);
    assert_eq!(status.block_cursor, 2);
    assert_eq!(status.blocks, 6);
}

#[rstest]
fn test_mid_submission_channel_ignores_reconfiguration() {
    let (provider, manager) = manager_with(size_bounded_config(300));
    for block in block_chain(10, 3, 200) {
        manager.add_l2_block(block).unwrap();
    }

    let first = manager.tx_data(l1_head(100)).unwrap();
    assert!(!first.use_blobs());

    provider.flip_blobs();
    let next = manager.tx_data(l1_head(100)).unwrap();
    assert!(!next.use_blobs(), "mid-submission channel keeps its modality");
    assert_eq!(next.frame().id, first.frame().id);
}

#[rstest]
fn test_timed_out_channel_requeues_blocks_and_ignores_stragglers() {
    let (_, manager) = manager_with(size_bounded_config(300));
    for block in block_chain(10, 3, 200) {
        manager.add_l2_block(block).unwrap();
    }

    let t1 = manager.tx_data(l1_head(100)).unwrap();
    let t2 = manager.tx_data(l1_head(100)).unwrap();
    assert_eq!(manager.status().inflight_txs, 2);

    // Confirmation past the inclusion deadline (98 + 100) times the channel
    // out; its blocks are requeued and the channel dropped.
    manager.tx_confirmed(&t1.id(), inclusion(199));
    let status = manager.status();
    assert_eq!(status.channels, 0);
    assert_eq!(status.block_cursor, 0);
    assert_eq!(status.blocks, 3);
    assert_eq!(status.inflight_txs, 0);

    // The second outcome arrives late; it is accepted and ignored.
    manager.tx_confirmed(&t2.id(), inclusion(199));
    assert_eq!(manager.status(), status);
}

#[rstest]
fn test_reorged_block_is_rejected_without_state_change() {
    let (_, manager) = manager_with(size_bounded_config(10_000));
    let blocks = block_chain(10, 2, 50);
    manager.add_l2_block(blocks[0].clone()).unwrap();

    let mut orphan = blocks[1].clone();
    orphan.info.block_info.parent_hash = B256::with_last_byte(0xbb);
    let status = manager.status();
    assert_eq!(manager.add_l2_block(orphan), Err(ChannelManagerError::Reorg));
    assert_eq!(manager.status(), status);

    manager.add_l2_block(blocks[1].clone()).unwrap();
    assert_eq!(manager.status().blocks, 2);
}

#[rstest]
fn test_prune_safe_blocks_dequeues_covered_blocks() {
    let (_, manager) = manager_with(size_bounded_config(10_000));
    let blocks = block_chain(10, 3, 50);
    for block in &blocks {
        manager.add_l2_block(block.clone()).unwrap();
    }

    manager.prune_safe_blocks(blocks[0].info);
    assert_eq!(manager.status().blocks, 2);

    // Safe head equal to the last queued block prunes everything.
    manager.prune_safe_blocks(blocks[2].info);
    assert_eq!(manager.status().blocks, 0);
    assert_eq!(manager.status().block_cursor, 0);
}

#[rstest]
fn test_prune_safe_blocks_reorg_clears() {
    let (_, manager) = manager_with(size_bounded_config(10_000));
    for block in block_chain(10, 3, 50) {
        manager.add_l2_block(block).unwrap();
    }

    // Safe head claims block 11 with a hash we never queued.
    let mut wrong = block_chain(11, 1, 50).remove(0).info;
    wrong.block_info.hash = B256::with_last_byte(0xee);
    manager.prune_safe_blocks(wrong);

    let status = manager.status();
    assert_eq!(status.blocks, 0);
    assert_eq!(status.channels, 0);
    assert_eq!(status.pending_da_bytes, 0);
}

#[rstest]
#[case::reversed(5)]
#[case::ahead(20)]
fn test_prune_safe_blocks_anomalies_clear(#[case] safe_number: u64) {
    let (_, manager) = manager_with(size_bounded_config(10_000));
    for block in block_chain(10, 3, 50) {
        manager.add_l2_block(block).unwrap();
    }
    manager.prune_safe_blocks(block_chain(safe_number, 1, 1).remove(0).info);
    assert_eq!(manager.status().blocks, 0);
}

#[rstest]
fn test_expected_progress_check() {
    let (_, manager) = manager_with(size_bounded_config(300));
    for block in block_chain(10, 3, 200) {
        manager.add_l2_block(block).unwrap();
    }
    // Fully submit the first channel (blocks 10 and 11).
    let txs = drain_confirming(&manager, l1_head(100), inclusion(100));
    assert!(!txs.is_empty());

    let stalled = SyncStatus {
        current_l1: l1_head(300),
        safe_l2: block_chain(10, 1, 1).remove(0).info,
        unsafe_l2: L2BlockInfo::default(),
    };
    assert_eq!(
        manager.check_expected_progress(stalled).unwrap_err(),
        ChannelManagerError::MissingExpectedProgress(txs[0].frame().id)
    );

    // Safe head covering the channel's latest block passes.
    let caught_up = SyncStatus {
        current_l1: l1_head(300),
        safe_l2: block_chain(11, 1, 1).remove(0).info,
        unsafe_l2: L2BlockInfo::default(),
    };
    manager.check_expected_progress(caught_up).unwrap();

    // Before the inclusion deadline there is nothing to flag.
    let early = SyncStatus {
        current_l1: l1_head(150),
        safe_l2: block_chain(10, 1, 1).remove(0).info,
        unsafe_l2: L2BlockInfo::default(),
    };
    manager.check_expected_progress(early).unwrap();
}

#[rstest]
fn test_empty_channel_invalidation_skips_rewind() {
    // A shadow-budgeted codec with a tiny target refuses the very first
    // block, producing a full channel with no blocks and a single empty
    // closing frame.
    let cfg = ChannelConfig {
        compressor_kind: CompressorType::Shadow,
        ..size_bounded_config(50)
    };
    let (_, manager) = manager_with(cfg);
    manager.add_l2_block(block_chain(10, 1, 200).remove(0)).unwrap();

    let txd = manager.tx_data(l1_head(100)).unwrap();
    assert!(txd.frame().is_last);
    assert_eq!(manager.status().block_cursor, 0, "no block entered the channel");

    // Timing the empty channel out must not touch the cursor.
    manager.tx_confirmed(&txd.id(), inclusion(199));
    let status = manager.status();
    assert_eq!(status.channels, 0);
    assert_eq!(status.blocks, 1);
    assert_eq!(status.block_cursor, 0);
}

#[rstest]
fn test_pending_da_bytes_tracks_unpacked_blocks() {
    let (_, manager) = manager_with(size_bounded_config(300));
    assert_eq!(manager.pending_da_bytes(), 0);

    let blocks = block_chain(10, 3, 200);
    let total: i64 = blocks.iter().map(|b| b.estimated_da_size() as i64).sum();
    for block in &blocks {
        manager.add_l2_block(block.clone()).unwrap();
    }
    assert_eq!(manager.pending_da_bytes(), total);

    // Packing blocks 10 and 11 into a channel leaves only block 12 pending.
    let _ = manager.tx_data(l1_head(100)).unwrap();
    assert_eq!(manager.pending_da_bytes(), blocks[2].estimated_da_size() as i64);
}
