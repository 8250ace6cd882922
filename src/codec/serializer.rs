//! Primitive serializer
//!
//! Encodes wire primitives into whichever transport the switcher has
//! selected. Nothing reaches the socket until `flush`.

use crate::config::{Config, DEFAULT_COMPRESS_BLOCK_SIZE};
use crate::error::{Result, WireError};
use crate::io::{Active, BinaryWriter, CompressWriter, CompressionMethod, Switcher};

use super::varint::{encode_var_int, MAX_VAR_INT_LEN};

/// Writes protocol primitives, optionally through block compression
pub struct BinarySerializer<W> {
    switcher: Switcher<W, CompressWriter<W>>,
    /// Fixed for the life of the session
    enable_compress: bool,
    closed: bool,
}

impl<W: BinaryWriter> BinarySerializer<W> {
    /// Wrap `writer`, compressing with LZ4 in default-sized blocks when
    /// `enable_compress` is set. Writing starts uncompressed.
    pub fn new(writer: W, enable_compress: bool) -> Self {
        Self::with_method(
            writer,
            enable_compress,
            CompressionMethod::Lz4,
            DEFAULT_COMPRESS_BLOCK_SIZE,
        )
    }

    /// Wrap `writer` with an explicit block method and block size
    pub fn with_method(
        writer: W,
        enable_compress: bool,
        method: CompressionMethod,
        block_size: usize,
    ) -> Self {
        let switcher = if enable_compress {
            Switcher::with_compression(CompressWriter::new(writer, method, block_size))
        } else {
            Switcher::plain(writer)
        };
        Self {
            switcher,
            enable_compress,
            closed: false,
        }
    }

    /// Wrap `writer` using the session settings in `config`
    pub fn from_config(writer: W, config: &Config) -> Self {
        Self::with_method(
            writer,
            config.compression,
            config.compression_method,
            config.compress_block_size,
        )
    }

    pub fn is_compression_enabled(&self) -> bool {
        self.enable_compress
    }

    /// Whether writes currently go through block compression
    pub fn is_compressed(&self) -> bool {
        !self.switcher.is_plain()
    }

    // -------------------------------------------------------------------------
    // Primitives
    // -------------------------------------------------------------------------

    pub fn write_var_int(&mut self, value: u64) -> Result<()> {
        let mut buf = [0u8; MAX_VAR_INT_LEN];
        let len = encode_var_int(value, &mut buf);
        self.active()?.write_bytes(&buf[..len])
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.active()?.write_byte(byte)
    }

    /// Goes through the varint path; 0 and 1 encode as a single byte
    pub fn write_boolean(&mut self, value: bool) -> Result<()> {
        self.write_var_int(value as u64)
    }

    pub fn write_short_le(&mut self, value: i16) -> Result<()> {
        self.active()?.write_bytes(&value.to_le_bytes())
    }

    pub fn write_int_le(&mut self, value: i32) -> Result<()> {
        self.active()?.write_bytes(&value.to_le_bytes())
    }

    pub fn write_long_le(&mut self, value: i64) -> Result<()> {
        self.active()?.write_bytes(&value.to_le_bytes())
    }

    pub fn write_float_le(&mut self, value: f32) -> Result<()> {
        self.write_int_le(value.to_bits() as i32)
    }

    pub fn write_double_le(&mut self, value: f64) -> Result<()> {
        self.write_long_le(value.to_bits() as i64)
    }

    /// Varint byte length followed by the UTF-8 bytes
    pub fn write_utf8_binary(&mut self, text: &str) -> Result<()> {
        self.write_bytes_binary(text.as_bytes())
    }

    /// Varint length followed by the raw bytes
    pub fn write_bytes_binary(&mut self, data: &[u8]) -> Result<()> {
        self.write_var_int(data.len() as u64)?;
        self.active()?.write_bytes(data)
    }

    /// Raw bytes, no length prefix
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.active()?.write_bytes(data)
    }

    pub fn flush(&mut self, force: bool) -> Result<()> {
        self.active()?.flush(force)
    }

    // -------------------------------------------------------------------------
    // Compression Switching
    // -------------------------------------------------------------------------

    /// Start writing compressed blocks (no-op without session compression)
    pub fn maybe_enable_compressed(&mut self) {
        if self.enable_compress {
            tracing::debug!("serializer switched to compressed transport");
            self.switcher.select(false);
        }
    }

    /// Return to plain writes (no-op without session compression).
    ///
    /// The pending compressed block is finalized and sent before the
    /// switch, so later plain bytes can never land inside it.
    pub fn maybe_disable_compressed(&mut self) -> Result<()> {
        if self.enable_compress {
            if !self.switcher.is_plain() {
                self.active()?.flush(true)?;
            }
            tracing::debug!("serializer switched to plain transport");
            self.switcher.select(true);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Release the active transport. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.switcher.get().close();
    }

    fn active(&mut self) -> Result<Active<'_, W, CompressWriter<W>>> {
        if self.closed {
            return Err(WireError::Closed);
        }
        Ok(self.switcher.get())
    }

    /// The plain transport, regardless of the active variant
    pub fn get_ref(&self) -> &W {
        self.switcher.plain_ref()
    }

    /// Unwrap the plain transport. Bytes still pending in a compressed
    /// block are discarded.
    pub fn into_inner(self) -> W {
        self.switcher.into_inner()
    }
}
