//! The channel-out boundary between the manager core and the codec.

use crate::{ChannelBuilderError, ChannelConfig, ChannelManagerError};
use core::fmt;
use hoist_comp::{ChannelCompressor, CompressorType, RatioCompressor, ShadowCompressor};
use hoist_protocol::{BatchType, ChannelId, Frame, L2Block, L2BlockInfo, RollupConfig};
use rand::RngCore;
use std::sync::Arc;

/// The codec surface the channel builder drives.
///
/// Implementations compress added blocks into an opaque stream and slice it
/// into [`Frame`]s. The only distinguished outcome is
/// [`ChannelBuilderError::Full`], which signals that the codec's budget is
/// exhausted and the offending block was not consumed.
pub trait ChannelOut: Send + fmt::Debug {
    /// The id of the channel under construction.
    fn id(&self) -> ChannelId;

    /// Adds a block to the channel, returning its reference info (including
    /// the L1 origin the builder tracks).
    fn add_block(&mut self, block: &L2Block) -> Result<L2BlockInfo, ChannelBuilderError>;

    /// Encoded input bytes accepted so far.
    fn input_bytes(&self) -> u64;

    /// Compressed bytes ready to be framed.
    fn ready_bytes(&self) -> usize;

    /// Compressed bytes already emitted as frames.
    fn output_bytes(&self) -> u64;

    /// Frames emitted so far.
    fn total_frames(&self) -> u64;

    /// Flushes buffered input so it becomes frameable.
    fn flush(&mut self) -> Result<(), ChannelBuilderError>;

    /// Finalizes the compressed stream.
    fn close(&mut self) -> Result<(), ChannelBuilderError>;

    /// Emits the next frame, at most `max_size` encoded bytes.
    fn output_frame(&mut self, max_size: usize) -> Result<Frame, ChannelBuilderError>;
}

/// The production [`ChannelOut`] over the `hoist-comp` codec.
#[derive(Debug)]
pub struct CompChannelOut<C>
where
    C: ChannelCompressor + fmt::Debug + Send,
{
    /// The inner codec.
    inner: hoist_comp::ChannelOut<C>,
    /// Compressed bytes emitted as frames.
    output_bytes: u64,
    /// Frames emitted.
    total_frames: u64,
}

impl<C> CompChannelOut<C>
where
    C: ChannelCompressor + fmt::Debug + Send,
{
    /// Creates a new [`CompChannelOut`] over the given compressor.
    pub fn new(id: ChannelId, rollup: Arc<RollupConfig>, compressor: C) -> Self {
        Self {
            inner: hoist_comp::ChannelOut::new(id, rollup, compressor),
            output_bytes: 0,
            total_frames: 0,
        }
    }
}

impl<C> ChannelOut for CompChannelOut<C>
where
    C: ChannelCompressor + fmt::Debug + Send,
{
    fn id(&self) -> ChannelId {
        self.inner.id
    }

    fn add_block(&mut self, block: &L2Block) -> Result<L2BlockInfo, ChannelBuilderError> {
        let batch = block.single_batch();
        self.inner.add_batch(&batch)?;
        Ok(block.info)
    }

    fn input_bytes(&self) -> u64 {
        self.inner.input_bytes()
    }

    fn ready_bytes(&self) -> usize {
        self.inner.ready_bytes()
    }

    fn output_bytes(&self) -> u64 {
        self.output_bytes
    }

    fn total_frames(&self) -> u64 {
        self.total_frames
    }

    fn flush(&mut self) -> Result<(), ChannelBuilderError> {
        self.inner.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), ChannelBuilderError> {
        self.inner.close()?;
        Ok(())
    }

    fn output_frame(&mut self, max_size: usize) -> Result<Frame, ChannelBuilderError> {
        let frame = self.inner.output_frame(max_size)?;
        self.output_bytes += frame.data.len() as u64;
        self.total_frames += 1;
        Ok(frame)
    }
}

/// Builds a fresh codec bound to a [`ChannelConfig`]. Replaceable for
/// testing.
pub trait ChannelOutFactory: Send + Sync + fmt::Debug {
    /// Creates a codec for a new channel under the given configuration.
    fn create(&self, cfg: &ChannelConfig) -> Result<Box<dyn ChannelOut>, ChannelManagerError>;
}

/// The production factory, building `hoist-comp` codecs.
#[derive(Debug, Clone)]
pub struct CompChannelOutFactory {
    /// The rollup parameters bounding every channel.
    rollup: Arc<RollupConfig>,
}

impl CompChannelOutFactory {
    /// Creates a new factory over the given rollup parameters.
    pub const fn new(rollup: Arc<RollupConfig>) -> Self {
        Self { rollup }
    }
}

impl ChannelOutFactory for CompChannelOutFactory {
    fn create(&self, cfg: &ChannelConfig) -> Result<Box<dyn ChannelOut>, ChannelManagerError> {
        if cfg.batch_type != BatchType::Single {
            return Err(ChannelManagerError::UnsupportedBatchType(cfg.batch_type));
        }
        let id = random_channel_id();
        let comp_cfg = cfg.compressor_config();
        let out: Box<dyn ChannelOut> = match cfg.compressor_kind {
            CompressorType::Ratio => Box::new(CompChannelOut::new(
                id,
                self.rollup.clone(),
                RatioCompressor::from(comp_cfg),
            )),
            CompressorType::Shadow => Box::new(CompChannelOut::new(
                id,
                self.rollup.clone(),
                ShadowCompressor::from(comp_cfg),
            )),
        };
        Ok(out)
    }
}

/// Generates a fresh random [`ChannelId`].
pub(crate) fn random_channel_id() -> ChannelId {
    let mut id = ChannelId::default();
    rand::rng().fill_bytes(&mut id);
    id
}
