//! A channel: build state plus the L1 submission lifecycle of its frames.

use crate::{ChannelBuilder, ChannelBuilderError, ChannelFullError, TxData, TxId};
use alloy_eips::BlockNumHash;
use hoist_protocol::{ChannelId, Frame, L2Block, L2BlockInfo};
use std::collections::{HashMap, VecDeque};
use tracing::warn;

/// A [`ChannelBuilder`] plus the lifecycle of its frames as L1
/// transactions: pending frames, in-flight transaction ids, confirmation
/// accounting, and the latched timeout verdict.
#[derive(Debug)]
pub struct Channel {
    /// The channel's build state.
    builder: ChannelBuilder,
    /// Frames awaiting dispatch, in submission order.
    pending_frames: VecDeque<Frame>,
    /// Frames dispatched and awaiting a terminal outcome.
    inflight: HashMap<TxId, Frame>,
    /// Frames confirmed on L1.
    confirmed_count: u64,
    /// Dispatch attempts made, across all frames.
    dispatched_count: u64,
    /// Attempt counter minting fresh [`TxId`]s.
    next_attempt: u32,
    /// The L1 block number by which every frame must be confirmed.
    max_inclusion_block: u64,
    /// Latched once a frame confirms past the inclusion deadline.
    timed_out: bool,
    /// The DA modality the channel was built under.
    use_blobs: bool,
    /// Whether closure has been logged and counted by the manager.
    closure_recorded: bool,
}

impl Channel {
    /// Creates a new [`Channel`] around the given builder.
    pub(crate) fn new(builder: ChannelBuilder) -> Self {
        let cfg = *builder.config();
        // A zero duration means the channel never times out on its own; no
        // inclusion deadline applies. The margin is clamped to the duration
        // window, so the deadline never precedes the channel's opening.
        let max_inclusion_block = if cfg.max_channel_duration == 0 {
            u64::MAX
        } else {
            builder.open_l1_block()
                + cfg.max_channel_duration.saturating_sub(cfg.sub_safety_margin)
        };
        let use_blobs = cfg.use_blobs;
        Self {
            builder,
            pending_frames: VecDeque::new(),
            inflight: HashMap::new(),
            confirmed_count: 0,
            dispatched_count: 0,
            next_attempt: 0,
            max_inclusion_block,
            timed_out: false,
            use_blobs,
            closure_recorded: false,
        }
    }

    /// The channel id.
    pub fn id(&self) -> ChannelId {
        self.builder.id()
    }

    /// The L1 block number by which every frame must be confirmed.
    pub const fn max_inclusion_block(&self) -> u64 {
        self.max_inclusion_block
    }

    /// Whether a frame is awaiting dispatch (including requeued failures).
    pub fn has_tx_data(&self) -> bool {
        !self.pending_frames.is_empty()
    }

    /// Pops the next pending frame and mints a fresh [`TxId`] for it.
    pub(crate) fn next_tx_data(&mut self) -> Option<TxData> {
        let frame = self.pending_frames.pop_front()?;
        let id = TxId::new(self.id(), frame.number, self.next_attempt);
        self.next_attempt += 1;
        self.dispatched_count += 1;
        self.inflight.insert(id, frame.clone());
        Some(TxData::new(id, frame, self.use_blobs))
    }

    /// Requeues the frame of a failed transaction at the head of the
    /// pending deque, preserving submission order across retries.
    pub(crate) fn tx_failed(&mut self, id: &TxId) {
        match self.inflight.remove(id) {
            Some(frame) => self.pending_frames.push_front(frame),
            None => warn!(target: "batcher", %id, "tx failure for unknown id, ignoring"),
        }
    }

    /// Records a confirmed transaction, returning `true` when the
    /// confirmation landed past the inclusion deadline and the channel is
    /// now timed out.
    pub(crate) fn tx_confirmed(&mut self, id: &TxId, inclusion_block: BlockNumHash) -> bool {
        if self.inflight.remove(id).is_none() {
            warn!(target: "batcher", %id, "confirmation for unknown id, ignoring");
            return false;
        }
        self.confirmed_count += 1;
        if inclusion_block.number > self.max_inclusion_block {
            warn!(
                target: "batcher",
                %id,
                inclusion_block = inclusion_block.number,
                max_inclusion_block = self.max_inclusion_block,
                "frame confirmed past inclusion deadline, channel timed out",
            );
            self.timed_out = true;
            return true;
        }
        false
    }

    /// Whether the channel has not leaked any bytes to L1.
    pub fn none_submitted(&self) -> bool {
        self.confirmed_count == 0 && self.inflight.is_empty() && self.dispatched_count == 0
    }

    /// Whether every frame of the (closed) channel has confirmed.
    pub fn is_fully_submitted(&self) -> bool {
        self.builder.is_full() && self.confirmed_count == self.builder.total_frames()
    }

    /// Whether a frame confirmed past the inclusion deadline.
    pub const fn is_timed_out(&self) -> bool {
        self.timed_out
    }

    /// Materializes frames from the builder into the pending deque.
    pub(crate) fn output_frames(&mut self) -> Result<(), ChannelBuilderError> {
        for frame in self.builder.output_frames()? {
            self.pending_frames.push_back(frame);
        }
        Ok(())
    }

    /// Feeds a block to the builder.
    pub(crate) fn add_block(&mut self, block: &L2Block) -> Result<(), ChannelBuilderError> {
        self.builder.add_block(block)
    }

    /// Latches the builder's duration timeout against `current_l1`.
    pub(crate) fn check_timeout(&mut self, current_l1: u64) {
        self.builder.check_timeout(current_l1);
    }

    /// Whether the channel accepts no more blocks.
    pub fn is_full(&self) -> bool {
        self.builder.is_full()
    }

    /// The reason the channel is full, if it is.
    pub fn full_err(&self) -> Option<ChannelFullError> {
        self.builder.full_err()
    }

    /// The blocks packed into the channel, in order.
    pub fn blocks(&self) -> &[L2Block] {
        self.builder.blocks()
    }

    /// The oldest packed L2 block.
    pub fn oldest_l2(&self) -> Option<L2BlockInfo> {
        self.builder.oldest_l2()
    }

    /// The latest packed L2 block.
    pub fn latest_l2(&self) -> Option<L2BlockInfo> {
        self.builder.latest_l2()
    }

    /// The L1 origin of the latest packed block.
    pub fn latest_l1_origin(&self) -> Option<BlockNumHash> {
        self.builder.latest_l1_origin()
    }

    /// Encoded input bytes accepted by the codec.
    pub fn input_bytes(&self) -> u64 {
        self.builder.input_bytes()
    }

    /// Compressed bytes emitted as frames.
    pub fn output_bytes(&self) -> u64 {
        self.builder.output_bytes()
    }

    /// Frames materialized so far.
    pub fn total_frames(&self) -> u64 {
        self.builder.total_frames()
    }

    /// Frames awaiting dispatch.
    pub fn pending_frame_count(&self) -> usize {
        self.pending_frames.len()
    }

    /// Frames dispatched and awaiting a terminal outcome.
    pub fn inflight_count(&self) -> usize {
        self.inflight.len()
    }

    /// Frames confirmed on L1.
    pub const fn confirmed_count(&self) -> u64 {
        self.confirmed_count
    }

    /// Whether closure has been logged and counted.
    pub(crate) const fn closure_recorded(&self) -> bool {
        self.closure_recorded
    }

    /// Marks closure as logged and counted.
    pub(crate) const fn mark_closure_recorded(&mut self) {
        self.closure_recorded = true;
    }
}
