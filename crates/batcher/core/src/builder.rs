//! Per-channel build state: accepted blocks, origin range, timeouts, and
//! frame emission.

use crate::{ChannelBuilderError, ChannelConfig, ChannelFullError, ChannelOut};
use alloy_eips::BlockNumHash;
use alloy_primitives::hex;
use hoist_protocol::{ChannelId, Frame, L2Block, L2BlockInfo};
use tracing::debug;

/// Builds one channel: feeds blocks to the codec and tracks the metadata
/// the manager needs for timeouts, pruning, and invalidation.
#[derive(Debug)]
pub struct ChannelBuilder {
    /// The configuration the channel is bound to.
    cfg: ChannelConfig,
    /// The codec compressing the channel's blocks.
    co: Box<dyn ChannelOut>,
    /// The blocks accepted into the channel, in order.
    blocks: Vec<L2Block>,
    /// The L1 origin of the oldest accepted block.
    oldest_l1_origin: Option<BlockNumHash>,
    /// The L1 origin of the latest accepted block.
    latest_l1_origin: Option<BlockNumHash>,
    /// The oldest accepted L2 block.
    oldest_l2: Option<L2BlockInfo>,
    /// The latest accepted L2 block.
    latest_l2: Option<L2BlockInfo>,
    /// The L1 block number at which construction began.
    open_l1_block: u64,
    /// The reason the channel is full, once latched.
    full_reason: Option<ChannelFullError>,
    /// Whether the codec stream has been finalized and drained.
    closed: bool,
}

impl ChannelBuilder {
    /// Creates a new [`ChannelBuilder`] over the given codec.
    pub(crate) fn new(cfg: ChannelConfig, co: Box<dyn ChannelOut>, open_l1_block: u64) -> Self {
        Self {
            cfg,
            co,
            blocks: Vec::new(),
            oldest_l1_origin: None,
            latest_l1_origin: None,
            oldest_l2: None,
            latest_l2: None,
            open_l1_block,
            full_reason: None,
            closed: false,
        }
    }

    /// The channel id.
    pub fn id(&self) -> ChannelId {
        self.co.id()
    }

    /// The configuration the channel is bound to.
    pub const fn config(&self) -> &ChannelConfig {
        &self.cfg
    }

    /// The L1 block number at which construction began.
    pub const fn open_l1_block(&self) -> u64 {
        self.open_l1_block
    }

    /// The blocks accepted into the channel, in order.
    pub fn blocks(&self) -> &[L2Block] {
        &self.blocks
    }

    /// Whether the channel accepts no more blocks.
    pub const fn is_full(&self) -> bool {
        self.full_reason.is_some()
    }

    /// The reason the channel is full, if it is.
    pub const fn full_err(&self) -> Option<ChannelFullError> {
        self.full_reason
    }

    /// The L1 origin of the oldest accepted block.
    pub const fn oldest_l1_origin(&self) -> Option<BlockNumHash> {
        self.oldest_l1_origin
    }

    /// The L1 origin of the latest accepted block.
    pub const fn latest_l1_origin(&self) -> Option<BlockNumHash> {
        self.latest_l1_origin
    }

    /// The oldest accepted L2 block.
    pub const fn oldest_l2(&self) -> Option<L2BlockInfo> {
        self.oldest_l2
    }

    /// The latest accepted L2 block.
    pub const fn latest_l2(&self) -> Option<L2BlockInfo> {
        self.latest_l2
    }

    /// Encoded input bytes accepted by the codec.
    pub fn input_bytes(&self) -> u64 {
        self.co.input_bytes()
    }

    /// Compressed bytes emitted as frames.
    pub fn output_bytes(&self) -> u64 {
        self.co.output_bytes()
    }

    /// Compressed bytes ready to be framed.
    pub fn ready_bytes(&self) -> usize {
        self.co.ready_bytes()
    }

    /// Frames emitted so far.
    pub fn total_frames(&self) -> u64 {
        self.co.total_frames()
    }

    /// Feeds a block to the codec and, on success, records it and updates
    /// the origin range.
    ///
    /// On [`ChannelBuilderError::Full`] the builder's state is untouched
    /// and the block is not consumed; the full reason is latched.
    pub(crate) fn add_block(&mut self, block: &L2Block) -> Result<(), ChannelBuilderError> {
        if let Some(reason) = self.full_reason {
            return Err(ChannelBuilderError::Full(reason));
        }
        let info = match self.co.add_block(block) {
            Ok(info) => info,
            Err(ChannelBuilderError::Full(reason)) => {
                debug!(
                    target: "batcher",
                    id = %hex::encode(self.id()),
                    %reason,
                    "channel full, block not accepted",
                );
                self.full_reason = Some(reason);
                return Err(ChannelBuilderError::Full(reason));
            }
            Err(err) => return Err(err),
        };
        if self.oldest_l1_origin.is_none() {
            self.oldest_l1_origin = Some(info.l1_origin);
        }
        if self.oldest_l2.is_none() {
            self.oldest_l2 = Some(info);
        }
        self.latest_l1_origin = Some(info.l1_origin);
        self.latest_l2 = Some(info);
        self.blocks.push(block.clone());
        Ok(())
    }

    /// Latches the duration timeout if `current_l1` has moved
    /// `max_channel_duration` or more blocks past the channel's opening.
    /// Idempotent; a zero duration disables the timeout.
    pub(crate) fn check_timeout(&mut self, current_l1: u64) {
        if self.full_reason.is_some() || self.cfg.max_channel_duration == 0 {
            return;
        }
        if current_l1.saturating_sub(self.open_l1_block) >= self.cfg.max_channel_duration {
            debug!(
                target: "batcher",
                id = %hex::encode(self.id()),
                current_l1,
                open_l1_block = self.open_l1_block,
                "channel duration timeout",
            );
            self.full_reason = Some(ChannelFullError::DurationTimeout);
        }
    }

    /// Materializes frames from the codec.
    ///
    /// While the channel is open only full-size frames are emitted; once it
    /// is full the stream is finalized and fully drained, ending with the
    /// `is_last` frame.
    pub(crate) fn output_frames(&mut self) -> Result<Vec<Frame>, ChannelBuilderError> {
        if self.is_full() {
            return self.close_and_output_all();
        }
        let mut frames = self.output_ready_frames()?;
        // Hitting the frame budget latches fullness mid-emission; drain the
        // stream in the same call so a full channel never strands bytes.
        if self.is_full() {
            frames.extend(self.close_and_output_all()?);
        }
        Ok(frames)
    }

    fn output_ready_frames(&mut self) -> Result<Vec<Frame>, ChannelBuilderError> {
        let mut frames = Vec::new();
        let max = self.cfg.max_frame_size as usize;
        while self.co.ready_bytes() >= max {
            frames.push(self.co.output_frame(max)?);
            if self.co.total_frames() >= self.cfg.target_num_frames {
                self.full_reason = Some(ChannelFullError::MaxFramesReached);
                break;
            }
        }
        Ok(frames)
    }

    fn close_and_output_all(&mut self) -> Result<Vec<Frame>, ChannelBuilderError> {
        if self.closed {
            // Already finalized and drained on a previous call.
            return Ok(Vec::new());
        }
        self.closed = true;
        self.co.close()?;

        let mut frames = Vec::new();
        let max = self.cfg.max_frame_size as usize;
        loop {
            let frame = self.co.output_frame(max)?;
            let is_last = frame.is_last;
            frames.push(frame);
            if is_last {
                return Ok(frames);
            }
        }
    }
}
