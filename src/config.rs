//! Configuration for colwire
//!
//! Centralized configuration with sensible defaults.

use crate::error::{Result, WireError};
use crate::io::{CompressionMethod, MAX_BLOCK_SIZE};

/// Default receive buffer capacity (1 MB)
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 1024 * 1024;

/// Default initial send buffer capacity (1 MB)
pub const DEFAULT_SEND_BUFFER_SIZE: usize = 1024 * 1024;

/// Default maximum uncompressed bytes per compressed block (1 MB)
pub const DEFAULT_COMPRESS_BLOCK_SIZE: usize = 1024 * 1024;

/// Main configuration for a wire session
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Buffer Configuration
    // -------------------------------------------------------------------------
    /// Fixed capacity of the receive buffer (in bytes)
    pub recv_buffer_size: usize,

    /// Initial capacity of the send buffer (in bytes); grows until flush
    pub send_buffer_size: usize,

    // -------------------------------------------------------------------------
    // Compression Configuration
    // -------------------------------------------------------------------------
    /// Whether the session may switch to the compressed transport.
    /// Immutable once the serializer/deserializer pair is built.
    pub compression: bool,

    /// Block method used by the compressing writer
    pub compression_method: CompressionMethod,

    /// Max uncompressed bytes per block before the writer emits it
    pub compress_block_size: usize,

    // -------------------------------------------------------------------------
    // Socket Configuration
    // -------------------------------------------------------------------------
    /// Connect timeout (milliseconds, 0 = OS default)
    pub connect_timeout_ms: u64,

    /// Socket read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    /// Disable Nagle's algorithm
    pub tcp_nodelay: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
            send_buffer_size: DEFAULT_SEND_BUFFER_SIZE,
            compression: false,
            compression_method: CompressionMethod::Lz4,
            compress_block_size: DEFAULT_COMPRESS_BLOCK_SIZE,
            connect_timeout_ms: 0,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            tcp_nodelay: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject sizes the transports cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.recv_buffer_size == 0 {
            return Err(WireError::Config(
                "recv_buffer_size must be greater than zero".to_string(),
            ));
        }
        if self.compress_block_size == 0 {
            return Err(WireError::Config(
                "compress_block_size must be greater than zero".to_string(),
            ));
        }
        if self.compress_block_size > MAX_BLOCK_SIZE {
            return Err(WireError::Config(format!(
                "compress_block_size {} exceeds the block limit of {}",
                self.compress_block_size, MAX_BLOCK_SIZE
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the receive buffer capacity (in bytes)
    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.config.recv_buffer_size = size;
        self
    }

    /// Set the initial send buffer capacity (in bytes)
    pub fn send_buffer_size(mut self, size: usize) -> Self {
        self.config.send_buffer_size = size;
        self
    }

    /// Enable or disable compression for the session
    pub fn compression(mut self, enabled: bool) -> Self {
        self.config.compression = enabled;
        self
    }

    /// Set the block compression method
    pub fn compression_method(mut self, method: CompressionMethod) -> Self {
        self.config.compression_method = method;
        self
    }

    /// Set the maximum uncompressed block size (in bytes)
    pub fn compress_block_size(mut self, size: usize) -> Self {
        self.config.compress_block_size = size;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn tcp_nodelay(mut self, nodelay: bool) -> Self {
        self.config.tcp_nodelay = nodelay;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
