//! Contains [`ChannelOut`], which builds a channel from singular batches.

use crate::{ChannelCompressor, CompressorError};
use alloc::{sync::Arc, vec, vec::Vec};
use hoist_protocol::{ChannelId, FRAME_V0_OVERHEAD, Frame, RollupConfig, SingleBatch};

/// An error returned by [`ChannelOut`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ChannelOutError {
    /// The channel is closed and accepts no more batches.
    #[error("The channel is already closed")]
    ChannelClosed,
    /// The requested frame size cannot hold the frame overhead.
    #[error("The max frame size is too small")]
    MaxFrameSizeTooSmall,
    /// An error from the compressor.
    #[error("Error from compression")]
    Compression(#[from] CompressorError),
    /// The encoded batch would push the channel past the RLP byte limit.
    #[error("The encoded batch exceeds the max RLP bytes per channel")]
    ExceedsMaxRlpBytesPerChannel,
}

/// [`ChannelOut`] accepts singular batches, compresses their encoded form,
/// and slices the compressed stream into [`Frame`]s.
#[derive(Debug)]
pub struct ChannelOut<C>
where
    C: ChannelCompressor,
{
    /// The unique identifier of the channel.
    pub id: ChannelId,
    /// The rollup parameters bounding the channel's RLP payload.
    pub config: Arc<RollupConfig>,
    /// The RLP length of the channel so far.
    pub rlp_length: u64,
    /// Whether the channel is closed.
    pub closed: bool,
    /// The next frame number.
    pub frame_number: u16,
    /// The compressor holding the channel's data.
    pub compressor: C,
}

impl<C> ChannelOut<C>
where
    C: ChannelCompressor,
{
    /// Creates a new [`ChannelOut`] with the given [`ChannelId`].
    pub const fn new(id: ChannelId, config: Arc<RollupConfig>, compressor: C) -> Self {
        Self { id, config, rlp_length: 0, closed: false, frame_number: 0, compressor }
    }

    /// Accepts the given [`SingleBatch`] into the channel, compressing its
    /// encoded form.
    ///
    /// On any error the channel's accounting is left untouched.
    pub fn add_batch(&mut self, batch: &SingleBatch) -> Result<(), ChannelOutError> {
        if self.closed {
            return Err(ChannelOutError::ChannelClosed);
        }

        let mut buf = Vec::new();
        batch.encode(&mut buf);

        if self.rlp_length + buf.len() as u64 > self.config.max_rlp_bytes_per_channel {
            return Err(ChannelOutError::ExceedsMaxRlpBytesPerChannel);
        }

        self.compressor.write(&buf)?;
        self.rlp_length += buf.len() as u64;
        Ok(())
    }

    /// Returns the total number of encoded input bytes accepted so far.
    pub const fn input_bytes(&self) -> u64 {
        self.rlp_length
    }

    /// Returns the number of compressed bytes ready to be framed.
    pub fn ready_bytes(&self) -> usize {
        self.compressor.len()
    }

    /// Whether the compressor has reached its configured budget.
    pub fn is_full(&self) -> bool {
        self.compressor.is_full()
    }

    /// Flushes the compressor so buffered input becomes frameable.
    pub fn flush(&mut self) -> Result<(), ChannelOutError> {
        self.compressor.flush()?;
        Ok(())
    }

    /// Closes the channel, finalizing the compressed stream.
    pub fn close(&mut self) -> Result<(), ChannelOutError> {
        if self.closed {
            return Err(ChannelOutError::ChannelClosed);
        }
        self.closed = true;
        self.compressor.close()?;
        Ok(())
    }

    /// Outputs the next [`Frame`], draining at most `max_size` encoded bytes
    /// (payload plus [`FRAME_V0_OVERHEAD`]) from the compressed stream.
    ///
    /// The frame is marked `is_last` when the channel is closed and the
    /// stream is fully drained by this frame.
    pub fn output_frame(&mut self, max_size: usize) -> Result<Frame, ChannelOutError> {
        if max_size < FRAME_V0_OVERHEAD {
            return Err(ChannelOutError::MaxFrameSizeTooSmall);
        }

        let take = (max_size - FRAME_V0_OVERHEAD).min(self.ready_bytes());
        let mut data = vec![0u8; take];
        let n = self.compressor.read(&mut data)?;
        data.truncate(n);

        let frame = Frame {
            id: self.id,
            number: self.frame_number,
            data,
            is_last: self.closed && self.ready_bytes() == 0,
        };
        self.frame_number += 1;
        Ok(frame)
    }
}
