//! Error types for colwire
//!
//! Every failure below the codec surfaces as a [`WireError`]. The layer is
//! fail-fast: nothing here retries or suppresses an error.

use std::io;

use thiserror::Error;

/// Result type alias using WireError
pub type Result<T> = std::result::Result<T, WireError>;

/// Unified error type for colwire operations
#[derive(Debug, Error)]
pub enum WireError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    /// Socket failure, including end-of-stream during a refill
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Operation attempted on a transport that was already released
    #[error("Transport closed")]
    Closed,

    // -------------------------------------------------------------------------
    // Block Compression Errors
    // -------------------------------------------------------------------------
    #[error("Compression error: {0}")]
    Compression(String),

    // -------------------------------------------------------------------------
    // Encoding Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl WireError {
    /// End-of-stream error raised when a refill reads nothing
    pub(crate) fn eof() -> Self {
        WireError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "attempt to read after eof",
        ))
    }

    /// True if the peer closed the stream while a read was pending
    pub fn is_eof(&self) -> bool {
        matches!(self, WireError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
    }
}
