//! Test fixtures for the batcher core.

use crate::{
    ChannelBuilderError, ChannelConfig, ChannelConfigProvider, ChannelFullError, ChannelOut,
};
use alloy_eips::BlockNumHash;
use alloy_primitives::{B256, Bytes};
use hoist_protocol::{BlockInfo, ChannelId, FRAME_V0_OVERHEAD, Frame, L2Block, L2BlockInfo};
use rand::{RngCore, SeedableRng, rngs::SmallRng};
use std::sync::Mutex;

/// Deterministic hash for L2 block `number`.
pub fn block_hash(number: u64) -> B256 {
    let mut out = [0u8; 32];
    out[0] = 0xb1;
    out[24..].copy_from_slice(&number.to_be_bytes());
    B256::from(out)
}

/// Deterministic L1 origin for L2 block `number`: one origin per four
/// blocks, starting near block 90.
pub fn l1_origin(number: u64) -> BlockNumHash {
    let origin_number = number / 4 + 90;
    let mut out = [0u8; 32];
    out[0] = 0x11;
    out[24..].copy_from_slice(&origin_number.to_be_bytes());
    BlockNumHash { hash: B256::from(out), number: origin_number }
}

/// Builds `count` parent-linked blocks starting at `start_number`, each
/// carrying one transaction of `tx_bytes` pseudorandom (incompressible)
/// bytes.
pub fn block_chain(start_number: u64, count: u64, tx_bytes: usize) -> Vec<L2Block> {
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

/// A channel configuration whose only closure trigger (besides duration
/// backstop at 100 L1 blocks) is an input-size budget of `budget` bytes.
pub fn size_bounded_config(budget: u64) -> ChannelConfig {
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
pub struct SwappableConfigProvider(Mutex<ChannelConfig>);

impl SwappableConfigProvider {
    /// Creates a provider yielding `cfg`.
    pub const fn new(cfg: ChannelConfig) -> Self {
        Self(Mutex::new(cfg))
    }

    /// Replaces the provided configuration.
    pub fn set(&self, cfg: ChannelConfig) {
        *self.0.lock().unwrap() = cfg;
    }

    /// Toggles the DA modality of the provided configuration.
    pub fn flip_blobs(&self) {
        let mut cfg = self.0.lock().unwrap();
        cfg.use_blobs = !cfg.use_blobs;
    }
}

impl ChannelConfigProvider for SwappableConfigProvider {
    fn channel_config(&self) -> ChannelConfig {
        *self.0.lock().unwrap()
    }
}

/// A scripted [`ChannelOut`]: accepts a fixed number of blocks, each
/// contributing a fixed number of ready bytes, then reports full.
#[derive(Debug)]
pub struct MockChannelOut {
    id: ChannelId,
    accept_blocks: usize,
    bytes_per_block: usize,
    accepted: usize,
    buf: Vec<u8>,
    input_bytes: u64,
    output_bytes: u64,
    total_frames: u64,
    closed: bool,
}

impl MockChannelOut {
    /// Creates a mock accepting `accept_blocks` blocks of
    /// `bytes_per_block` ready bytes each.
    pub const fn new(id: ChannelId, accept_blocks: usize, bytes_per_block: usize) -> Self {
        Self {
            id,
            accept_blocks,
            bytes_per_block,
            accepted: 0,
            buf: Vec::new(),
            input_bytes: 0,
            output_bytes: 0,
            total_frames: 0,
            closed: false,
        }
    }
}

impl ChannelOut for MockChannelOut {
    fn id(&self) -> ChannelId {
        self.id
    }

    fn add_block(&mut self, block: &L2Block) -> Result<L2BlockInfo, ChannelBuilderError> {
        if self.closed {
            return Err(ChannelBuilderError::Full(ChannelFullError::Terminated));
        }
        if self.accepted >= self.accept_blocks {
            return Err(ChannelBuilderError::Full(ChannelFullError::CompressorFull));
        }
        self.accepted += 1;
        self.buf.extend(std::iter::repeat_n(0xee, self.bytes_per_block));
        self.input_bytes += self.bytes_per_block as u64;
        Ok(block.info)
    }

    fn input_bytes(&self) -> u64 {
        self.input_bytes
    }

    fn ready_bytes(&self) -> usize {
        self.buf.len()
    }

    fn output_bytes(&self) -> u64 {
        self.output_bytes
    }

    fn total_frames(&self) -> u64 {
        self.total_frames
    }

    fn flush(&mut self) -> Result<(), ChannelBuilderError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), ChannelBuilderError> {
        self.closed = true;
        Ok(())
    }

    fn output_frame(&mut self, max_size: usize) -> Result<Frame, ChannelBuilderError> {
        let take = max_size.saturating_sub(FRAME_V0_OVERHEAD).min(self.buf.len());
        let data: Vec<u8> = self.buf.drain(..take).collect();
        let frame = Frame {
            id: self.id,
            number: self.total_frames as u16,
            data,
            is_last: self.closed && self.buf.is_empty(),
        };
        self.total_frames += 1;
        self.output_bytes += take as u64;
        Ok(frame)
    }
}
