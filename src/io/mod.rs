//! Transport Module
//!
//! Byte-level transports the codec reads from and writes to.
//!
//! ## Layering
//! ```text
//!   BinarySerializer / BinaryDeserializer
//!                   │
//!                   ▼
//!               Switcher ──────────────┐
//!                   │                  │
//!                   ▼                  ▼
//!         CompressWriter /        (plain path)
//!         DecompressReader             │
//!                   │                  │
//!                   └────────┬─────────┘
//!                            ▼
//!               SocketWriter / SocketReader
//!                            │
//!                            ▼
//!                          socket
//! ```
//!
//! Every transport fully satisfies each call before returning: reads
//! block until the requested bytes are available, writes never leave a
//! partial value behind.

mod compress;
mod socket_reader;
mod socket_writer;
mod switcher;

pub use compress::{
    encode_block, BlockHeader, CompressWriter, CompressionMethod, DecompressReader,
    BLOCK_HEADER_SIZE, MAX_BLOCK_SIZE, MAX_COMPRESSED_SIZE,
};
pub use socket_reader::SocketReader;
pub use socket_writer::SocketWriter;
pub use switcher::{Active, Layered, Switcher};

use crate::error::{Result, WireError};

/// Read side of the transport capability
pub trait BinaryReader {
    /// Read a single byte, blocking until one is available
    fn read_byte(&mut self) -> Result<u8>;

    /// Fill `buf` completely, blocking until every byte has arrived.
    ///
    /// Returns the number of bytes read, which is always `buf.len()`.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Release resources. Idempotent and infallible.
    fn close(&mut self);
}

/// Write side of the transport capability
pub trait BinaryWriter {
    /// Append a single byte
    fn write_byte(&mut self, byte: u8) -> Result<()>;

    /// Append all of `bytes`
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    /// Append `length` bytes of `bytes` starting at `offset`
    fn write_bytes_at(&mut self, bytes: &[u8], offset: usize, length: usize) -> Result<()> {
        let end = offset.checked_add(length).filter(|&end| end <= bytes.len());
        match end {
            Some(end) => self.write_bytes(&bytes[offset..end]),
            None => Err(WireError::Protocol(format!(
                "write range {}+{} out of bounds for {} bytes",
                offset,
                length,
                bytes.len()
            ))),
        }
    }

    /// Push buffered bytes to the peer.
    ///
    /// `force` asks compressing transports to finalize the current block
    /// even if it is not full; plain transports ignore it.
    fn flush(&mut self, force: bool) -> Result<()>;

    /// Release resources. Idempotent and infallible.
    fn close(&mut self);
}

impl<T: BinaryReader + ?Sized> BinaryReader for &mut T {
    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read_exact(buf)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

impl<T: BinaryWriter + ?Sized> BinaryWriter for &mut T {
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        (**self).write_byte(byte)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_bytes(bytes)
    }

    fn flush(&mut self, force: bool) -> Result<()> {
        (**self).flush(force)
    }

    fn close(&mut self) {
        (**self).close()
    }
}
