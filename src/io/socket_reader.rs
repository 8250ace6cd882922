//! Buffered socket reader
//!
//! Fixed-capacity receive buffer in front of a blocking byte stream.

use std::io::{ErrorKind, Read};

use crate::error::{Result, WireError};

use super::BinaryReader;

/// Reads from a byte stream through a fixed-capacity receive buffer.
///
/// Invariant: `read_pos <= write_pos <= buf.len()`. Bytes in
/// `read_pos..write_pos` are unread and survive every refill.
pub struct SocketReader<R> {
    /// Underlying stream (usually a `TcpStream`)
    inner: R,
    /// Receive buffer, sized once at construction
    buf: Box<[u8]>,
    /// Next unread byte
    read_pos: usize,
    /// End of valid data
    write_pos: usize,
    closed: bool,
}

impl<R: Read> SocketReader<R> {
    /// Wrap `inner` with a receive buffer of `capacity` bytes
    pub fn new(inner: R, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner,
            buf: vec![0u8; capacity].into_boxed_slice(),
            read_pos: 0,
            write_pos: 0,
            closed: false,
        }
    }

    /// Total capacity of the receive buffer
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes received but not yet consumed
    pub fn buffered(&self) -> usize {
        self.write_pos - self.read_pos
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Make at least `at_least` bytes readable, or at least one more byte
    /// if the socket delivers less.
    ///
    /// `at_least` must not exceed the capacity.
    fn maybe_refill(&mut self, at_least: usize) -> Result<()> {
        if self.closed {
            return Err(WireError::Closed);
        }
        if self.buffered() >= at_least {
            return Ok(());
        }

        // Compact: move the unread tail to the front
        if self.read_pos > 0 {
            self.buf.copy_within(self.read_pos..self.write_pos, 0);
            self.write_pos -= self.read_pos;
            self.read_pos = 0;
        }

        loop {
            match self.inner.read(&mut self.buf[self.write_pos..]) {
                Ok(0) => return Err(WireError::eof()),
                Ok(n) => {
                    self.write_pos += n;
                    tracing::trace!(received = n, buffered = self.buffered(), "refilled receive buffer");
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl<R: Read> BinaryReader for SocketReader<R> {
    fn read_byte(&mut self) -> Result<u8> {
        self.maybe_refill(1)?;
        let byte = self.buf[self.read_pos];
        self.read_pos += 1;
        Ok(byte)
    }

    fn read_exact(&mut self, dst: &mut [u8]) -> Result<usize> {
        let mut offset = 0;
        while offset < dst.len() {
            let remaining = dst.len() - offset;
            self.maybe_refill(remaining.min(self.buf.len()))?;

            let len = remaining.min(self.buffered());
            dst[offset..offset + len].copy_from_slice(&self.buf[self.read_pos..self.read_pos + len]);
            self.read_pos += len;
            offset += len;
        }
        Ok(dst.len())
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.buf = Box::new([]);
        self.read_pos = 0;
        self.write_pos = 0;
        tracing::trace!("socket reader closed");
    }
}
