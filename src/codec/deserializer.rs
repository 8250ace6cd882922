//! Primitive deserializer
//!
//! Decodes wire primitives from whichever transport the switcher has
//! selected. Block boundaries are invisible here.

use bytes::Bytes;

use crate::config::Config;
use crate::error::{Result, WireError};
use crate::io::{Active, BinaryReader, DecompressReader, Switcher};

use super::varint::decode_var_int;

/// Largest length prefix accepted for a byte string
const MAX_BINARY_LEN: u64 = i32::MAX as u64;

/// Reads protocol primitives, optionally through block decompression
pub struct BinaryDeserializer<R> {
    switcher: Switcher<R, DecompressReader<R>>,
    /// Fixed for the life of the session
    enable_compress: bool,
    closed: bool,
}

impl<R: BinaryReader> BinaryDeserializer<R> {
    /// Wrap `reader`. With `enable_compress` a decompressing transport is
    /// layered on top, but reading starts uncompressed.
    pub fn new(reader: R, enable_compress: bool) -> Self {
        let switcher = if enable_compress {
            Switcher::with_compression(DecompressReader::new(reader))
        } else {
            Switcher::plain(reader)
        };
        Self {
            switcher,
            enable_compress,
            closed: false,
        }
    }

    /// Wrap `reader` using the session settings in `config`
    pub fn from_config(reader: R, config: &Config) -> Self {
        Self::new(reader, config.compression)
    }

    pub fn is_compression_enabled(&self) -> bool {
        self.enable_compress
    }

    /// Whether reads currently go through block decompression
    pub fn is_compressed(&self) -> bool {
        !self.switcher.is_plain()
    }

    // -------------------------------------------------------------------------
    // Primitives
    // -------------------------------------------------------------------------

    pub fn read_var_int(&mut self) -> Result<u64> {
        if self.closed {
            return Err(WireError::Closed);
        }
        let switcher = &mut self.switcher;
        decode_var_int(|| switcher.get().read_byte())
    }

    pub fn read_short_le(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_int_le(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_long_le(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    pub fn read_float_le(&mut self) -> Result<f32> {
        Ok(f32::from_bits(u32::from_le_bytes(self.read_array()?)))
    }

    pub fn read_double_le(&mut self) -> Result<f64> {
        Ok(f64::from_bits(u64::from_le_bytes(self.read_array()?)))
    }

    /// One byte; any nonzero value is true
    pub fn read_boolean(&mut self) -> Result<bool> {
        Ok(self.read_byte()? != 0)
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        self.active()?.read_byte()
    }

    /// Varint length followed by that many raw bytes
    pub fn read_bytes_binary(&mut self) -> Result<Bytes> {
        let len = self.read_binary_len()?;
        self.read_bytes(len)
    }

    /// Varint length followed by UTF-8 text.
    ///
    /// Invalid sequences are replaced with U+FFFD rather than rejected.
    pub fn read_utf8_binary(&mut self) -> Result<String> {
        let len = self.read_binary_len()?;
        if len == 0 {
            return Ok(String::new());
        }

        let mut data = vec![0u8; len];
        self.active()?.read_exact(&mut data)?;
        Ok(String::from_utf8(data)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
    }

    /// Exactly `size` raw bytes, no length prefix
    pub fn read_bytes(&mut self, size: usize) -> Result<Bytes> {
        let mut data = vec![0u8; size];
        self.active()?.read_exact(&mut data)?;
        Ok(Bytes::from(data))
    }

    fn read_binary_len(&mut self) -> Result<usize> {
        let len = self.read_var_int()?;
        if len > MAX_BINARY_LEN {
            return Err(WireError::Protocol(format!(
                "Length prefix too large: {} bytes (max {})",
                len, MAX_BINARY_LEN
            )));
        }
        Ok(len as usize)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut raw = [0u8; N];
        self.active()?.read_exact(&mut raw)?;
        Ok(raw)
    }

    // -------------------------------------------------------------------------
    // Compression Switching
    // -------------------------------------------------------------------------

    /// Start reading compressed blocks (no-op without session compression)
    pub fn maybe_enable_compressed(&mut self) {
        if self.enable_compress {
            tracing::debug!("deserializer switched to compressed transport");
            self.switcher.select(false);
        }
    }

    /// Return to plain reads (no-op without session compression)
    pub fn maybe_disable_compressed(&mut self) {
        if self.enable_compress {
            tracing::debug!("deserializer switched to plain transport");
            self.switcher.select(true);
        }
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

    fn active(&mut self) -> Result<Active<'_, R, DecompressReader<R>>> {
        if self.closed {
            return Err(WireError::Closed);
        }
        Ok(self.switcher.get())
    }

    /// The plain transport, regardless of the active variant
    pub fn get_ref(&self) -> &R {
        self.switcher.plain_ref()
    }

    pub fn into_inner(self) -> R {
        self.switcher.into_inner()
    }
}
