//! Test utilities for the compression crate.

use crate::{ChannelCompressor, CompressorError, CompressorResult, CompressorWriter};
use alloc::vec::Vec;

/// A mock compressor that stores written bytes verbatim.
#[derive(Debug, Clone, Default)]
pub struct MockCompressor {
    /// Bytes written and not yet read back.
    pub buf: Vec<u8>,
    /// Whether the compressor reports itself full and rejects writes.
    pub full: bool,
    /// Whether reads fail.
    pub read_error: bool,
    /// Whether the compressor has been closed.
    pub closed: bool,
}

impl CompressorWriter for MockCompressor {
    fn write(&mut self, data: &[u8]) -> CompressorResult<usize> {
        if self.full {
            return Err(CompressorError::Full);
        }
        if self.closed {
            return Err(CompressorError::Closed);
        }
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> CompressorResult<()> {
        Ok(())
    }

    fn close(&mut self) -> CompressorResult<()> {
        if self.closed {
            return Err(CompressorError::Closed);
        }
        self.closed = true;
        Ok(())
    }

    fn reset(&mut self) {
        self.buf.clear();
        self.full = false;
        self.closed = false;
    }

    fn len(&self) -> usize {
        self.buf.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> CompressorResult<usize> {
        if self.read_error {
            return Err(CompressorError::Compression);
        }
        let n = self.buf.len().min(buf.len());
        buf[..n].copy_from_slice(&self.buf[..n]);
        self.buf.drain(..n);
        Ok(n)
    }
}

impl ChannelCompressor for MockCompressor {
    fn is_full(&self) -> bool {
        self.full
    }
}
