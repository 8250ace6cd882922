//! Buffered socket writer
//!
//! Accumulates writes in memory; the socket only sees bytes on `flush`.

use std::io::Write;

use bytes::{BufMut, BytesMut};

use crate::error::{Result, WireError};

use super::BinaryWriter;

/// Writes to a byte stream through a growable send buffer
pub struct SocketWriter<W> {
    inner: W,
    /// Pending bytes, drained completely on every flush
    buf: BytesMut,
    closed: bool,
}

impl<W: Write> SocketWriter<W> {
    /// Wrap `inner` with a send buffer of `capacity` initial bytes
    pub fn new(inner: W, capacity: usize) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(capacity),
            closed: false,
        }
    }

    /// Bytes written but not yet flushed
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwrap the stream. Unflushed bytes are discarded.
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(WireError::Closed);
        }
        Ok(())
    }
}

impl<W: Write> BinaryWriter for SocketWriter<W> {
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.ensure_open()?;
        self.buf.put_u8(byte);
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_open()?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self, _force: bool) -> Result<()> {
        self.ensure_open()?;
        if !self.buf.is_empty() {
            tracing::trace!(bytes = self.buf.len(), "flushing send buffer");
            // Buffer is empty after every flush, failed or not
            let written = self.inner.write_all(&self.buf);
            self.buf.clear();
            written?;
        }
        self.inner.flush()?;
        Ok(())
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.buf = BytesMut::new();
        tracing::trace!("socket writer closed");
    }
}
