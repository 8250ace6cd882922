//! # colwire
//!
//! Binary transport layer for a columnar-store native protocol client:
//! - Buffered socket reader/writer with refill-on-underrun
//! - Exact-width primitive codec (varint, little-endian fixed width, length-prefixed)
//! - Block compression that can be switched on and off mid-stream
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Query / result-set protocol (caller)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │          BinarySerializer / BinaryDeserializer              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Switcher                             │
//! └─────────────────────┬───────────────────────────────────────┘
//!          ┌────────────┴────────────┐
//!          ▼                         │
//!   ┌─────────────┐                  │
//!   │ Compressed  │                  │
//!   │   blocks    │                  │
//!   └──────┬──────┘                  │
//!          └────────────┬────────────┘
//!                       ▼
//!              ┌─────────────────┐
//!              │ Socket transport│
//!              │ (recv/send buf) │
//!              └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod io;
pub mod codec;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{WireError, Result};
pub use config::Config;
pub use codec::{BinaryDeserializer, BinarySerializer};
pub use io::{BinaryReader, BinaryWriter};
pub use network::Channel;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of colwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
