//! Block compression transports
//!
//! ## Block Format
//! ```text
//! ┌───────────┬────────────┬──────────────┬────────────────┬──────────────┐
//! │ CRC32 (4) │ Method (1) │ Compressed   │ Uncompressed   │   Payload    │
//! │           │            │ Size (4)     │ Size (4)       │              │
//! └───────────┴────────────┴──────────────┴────────────────┴──────────────┘
//! ```
//! - All integers are little-endian.
//! - Compressed size counts the method byte, both size fields, and the payload.
//! - The CRC32 covers every byte after the checksum field.

use bytes::{BufMut, BytesMut};

use crate::error::{Result, WireError};

use super::switcher::Layered;
use super::{BinaryReader, BinaryWriter};

/// Full header size: checksum + method + compressed size + uncompressed size
pub const BLOCK_HEADER_SIZE: usize = 13;

/// Header bytes counted by `compressed_size`
const SIZED_HEADER_SIZE: usize = 9;

/// Largest uncompressed block either side accepts (1 GB)
pub const MAX_BLOCK_SIZE: usize = 1 << 30;

/// Largest `compressed_size` a full block can carry: the LZ4 worst case
/// for `MAX_BLOCK_SIZE` input bytes plus the sized header
pub const MAX_COMPRESSED_SIZE: usize =
    SIZED_HEADER_SIZE + MAX_BLOCK_SIZE + MAX_BLOCK_SIZE / 255 + 16;

/// Block payload encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CompressionMethod {
    /// Payload stored as-is
    Stored = 0x02,
    /// LZ4 block format
    Lz4 = 0x82,
}

impl CompressionMethod {
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0x02 => Ok(CompressionMethod::Stored),
            0x82 => Ok(CompressionMethod::Lz4),
            _ => Err(WireError::Compression(format!(
                "Unknown compression method: 0x{:02x}",
                byte
            ))),
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    fn compress(self, data: &[u8]) -> Vec<u8> {
        match self {
            CompressionMethod::Stored => data.to_vec(),
            CompressionMethod::Lz4 => lz4_flex::block::compress(data),
        }
    }

    fn decompress(self, payload: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
        let data = match self {
            CompressionMethod::Stored => payload.to_vec(),
            CompressionMethod::Lz4 => lz4_flex::block::decompress(payload, uncompressed_size)
                .map_err(|e| WireError::Compression(format!("LZ4 decode failed: {}", e)))?,
        };
        if data.len() != uncompressed_size {
            return Err(WireError::Compression(format!(
                "Block decoded to {} bytes, header says {}",
                data.len(),
                uncompressed_size
            )));
        }
        Ok(data)
    }
}

/// Header of a single compressed block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub checksum: u32,
    pub method: CompressionMethod,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
}

impl BlockHeader {
    /// Read and sanity-check a header from `reader`
    pub fn read_from<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut raw = [0u8; BLOCK_HEADER_SIZE];
        reader.read_exact(&mut raw)?;

        let checksum = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
        let method = CompressionMethod::from_byte(raw[4])?;
        let compressed_size = u32::from_le_bytes([raw[5], raw[6], raw[7], raw[8]]);
        let uncompressed_size = u32::from_le_bytes([raw[9], raw[10], raw[11], raw[12]]);

        if (compressed_size as usize) < SIZED_HEADER_SIZE {
            return Err(WireError::Compression(format!(
                "Compressed size {} smaller than block header",
                compressed_size
            )));
        }
        if uncompressed_size as usize > MAX_BLOCK_SIZE {
            return Err(WireError::Compression(format!(
                "Block too large: {} uncompressed bytes (max {})",
                uncompressed_size, MAX_BLOCK_SIZE
            )));
        }
        if compressed_size as usize > MAX_COMPRESSED_SIZE {
            return Err(WireError::Compression(format!(
                "Block too large: {} compressed bytes (max {})",
                compressed_size, MAX_COMPRESSED_SIZE
            )));
        }

        Ok(Self {
            checksum,
            method,
            compressed_size,
            uncompressed_size,
        })
    }

    /// Length of the payload that follows the header
    pub fn payload_len(&self) -> usize {
        self.compressed_size as usize - SIZED_HEADER_SIZE
    }

    /// Header bytes covered by the checksum
    fn sized_header(&self) -> [u8; SIZED_HEADER_SIZE] {
        let mut raw = [0u8; SIZED_HEADER_SIZE];
        raw[0] = self.method.as_byte();
        raw[1..5].copy_from_slice(&self.compressed_size.to_le_bytes());
        raw[5..9].copy_from_slice(&self.uncompressed_size.to_le_bytes());
        raw
    }

    /// Check the payload against the header checksum
    pub fn verify(&self, payload: &[u8]) -> Result<()> {
        let actual = checksum(&self.sized_header(), payload);
        if actual != self.checksum {
            return Err(WireError::Compression(format!(
                "Block checksum mismatch: expected {:08x}, got {:08x}",
                self.checksum, actual
            )));
        }
        Ok(())
    }

    /// Verify and decode the payload of this block
    pub fn decode_payload(&self, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() != self.payload_len() {
            return Err(WireError::Compression(format!(
                "Block payload is {} bytes, header says {}",
                payload.len(),
                self.payload_len()
            )));
        }
        self.verify(payload)?;
        self.method.decompress(payload, self.uncompressed_size as usize)
    }
}

fn checksum(sized_header: &[u8], payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(sized_header);
    hasher.update(payload);
    hasher.finalize()
}

/// Encode `data` as one complete block (header + payload)
pub fn encode_block(method: CompressionMethod, data: &[u8]) -> Vec<u8> {
    let payload = method.compress(data);

    let mut header = BlockHeader {
        checksum: 0,
        method,
        compressed_size: (SIZED_HEADER_SIZE + payload.len()) as u32,
        uncompressed_size: data.len() as u32,
    };
    let sized = header.sized_header();
    header.checksum = checksum(&sized, &payload);

    let mut block = Vec::with_capacity(BLOCK_HEADER_SIZE + payload.len());
    block.extend_from_slice(&header.checksum.to_le_bytes());
    block.extend_from_slice(&sized);
    block.extend_from_slice(&payload);
    block
}

// =============================================================================
// Compressing Writer
// =============================================================================

/// Frames written bytes into compressed blocks on the inner writer.
///
/// A block is emitted whenever `block_size` bytes accumulate, and on
/// `flush(true)` for whatever is pending.
pub struct CompressWriter<W> {
    inner: W,
    method: CompressionMethod,
    block_size: usize,
    /// Uncompressed bytes of the block being built
    buf: BytesMut,
    closed: bool,
}

impl<W: BinaryWriter> CompressWriter<W> {
    pub fn new(inner: W, method: CompressionMethod, block_size: usize) -> Self {
        let block_size = block_size.clamp(1, MAX_BLOCK_SIZE);
        Self {
            inner,
            method,
            block_size,
            buf: BytesMut::with_capacity(block_size),
            closed: false,
        }
    }

    /// Bytes waiting for the current block to be emitted
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(WireError::Closed);
        }
        Ok(())
    }

    fn emit_block(&mut self) -> Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let block = encode_block(self.method, &self.buf);
        tracing::trace!(
            uncompressed = self.buf.len(),
            compressed = block.len() - BLOCK_HEADER_SIZE,
            "emitting compressed block"
        );
        self.buf.clear();
        self.inner.write_bytes(&block)
    }
}

impl<W: BinaryWriter> BinaryWriter for CompressWriter<W> {
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.ensure_open()?;
        self.buf.put_u8(byte);
        if self.buf.len() >= self.block_size {
            self.emit_block()?;
        }
        Ok(())
    }

    fn write_bytes(&mut self, mut bytes: &[u8]) -> Result<()> {
        self.ensure_open()?;
        while !bytes.is_empty() {
            let room = self.block_size - self.buf.len();
            let (head, rest) = bytes.split_at(room.min(bytes.len()));
            self.buf.extend_from_slice(head);
            if self.buf.len() >= self.block_size {
                self.emit_block()?;
            }
            bytes = rest;
        }
        Ok(())
    }

    fn flush(&mut self, force: bool) -> Result<()> {
        self.ensure_open()?;
        if force {
            self.emit_block()?;
        }
        self.inner.flush(force)
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.buf = BytesMut::new();
        self.inner.close();
    }
}

impl<W> Layered<W> for CompressWriter<W> {
    fn inner(&self) -> &W {
        &self.inner
    }

    fn inner_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    fn into_inner(self) -> W {
        self.inner
    }
}

// =============================================================================
// Decompressing Reader
// =============================================================================

/// Serves bytes from compressed blocks read off the inner reader.
///
/// Values may straddle block boundaries; the next block is fetched as
/// soon as the current one is exhausted.
pub struct DecompressReader<R> {
    inner: R,
    /// Decoded bytes of the current block
    block: Vec<u8>,
    pos: usize,
    closed: bool,
}

impl<R: BinaryReader> DecompressReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            block: Vec::new(),
            pos: 0,
            closed: false,
        }
    }

    /// Decoded bytes not yet consumed from the current block
    pub fn buffered(&self) -> usize {
        self.block.len() - self.pos
    }

    fn maybe_next_block(&mut self) -> Result<()> {
        if self.closed {
            return Err(WireError::Closed);
        }
        while self.pos >= self.block.len() {
            let header = BlockHeader::read_from(&mut self.inner)?;
            let mut payload = vec![0u8; header.payload_len()];
            self.inner.read_exact(&mut payload)?;
            self.block = header.decode_payload(&payload)?;
            self.pos = 0;
            tracing::trace!(
                compressed = payload.len(),
                uncompressed = self.block.len(),
                "decoded compressed block"
            );
        }
        Ok(())
    }
}

impl<R: BinaryReader> BinaryReader for DecompressReader<R> {
    fn read_byte(&mut self) -> Result<u8> {
        self.maybe_next_block()?;
        let byte = self.block[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    fn read_exact(&mut self, dst: &mut [u8]) -> Result<usize> {
        let mut offset = 0;
        while offset < dst.len() {
            self.maybe_next_block()?;
            let len = (dst.len() - offset).min(self.buffered());
            dst[offset..offset + len].copy_from_slice(&self.block[self.pos..self.pos + len]);
            self.pos += len;
            offset += len;
        }
        Ok(dst.len())
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.block = Vec::new();
        self.pos = 0;
        self.inner.close();
    }
}

impl<R> Layered<R> for DecompressReader<R> {
    fn inner(&self) -> &R {
        &self.inner
    }

    fn inner_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    fn into_inner(self) -> R {
        self.inner
    }
}
