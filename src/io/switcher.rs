//! Transport selector
//!
//! Routes every call to either the plain transport or the compressing
//! transport layered on top of it.

use crate::error::Result;

use super::{BinaryReader, BinaryWriter};

/// A transport that wraps (and owns) a plain transport
pub trait Layered<P> {
    fn inner(&self) -> &P;
    fn inner_mut(&mut self) -> &mut P;
    fn into_inner(self) -> P;
}

/// Installed transports. The compressing variant owns the plain one, so
/// both exist without sharing.
enum Slot<P, C> {
    Plain(P),
    Compressing(C),
}

/// Holds the session's transports and the active-variant flag.
///
/// Sessions start on the plain transport. The compressing transport can
/// only be selected if it was installed at construction.
pub struct Switcher<P, C> {
    slot: Slot<P, C>,
    use_plain: bool,
}

/// Borrow of whichever transport is currently selected
pub enum Active<'a, P, C> {
    Plain(&'a mut P),
    Compressed(&'a mut C),
}

impl<P, C: Layered<P>> Switcher<P, C> {
    /// Switcher for a session without compression
    pub fn plain(transport: P) -> Self {
        Self {
            slot: Slot::Plain(transport),
            use_plain: true,
        }
    }

    /// Switcher for a compression-enabled session; starts on the plain path
    pub fn with_compression(transport: C) -> Self {
        Self {
            slot: Slot::Compressing(transport),
            use_plain: true,
        }
    }

    /// Whether a compressing transport is installed
    pub fn has_compressed(&self) -> bool {
        matches!(self.slot, Slot::Compressing(_))
    }

    /// Whether the plain transport is currently selected
    pub fn is_plain(&self) -> bool {
        self.use_plain
    }

    /// The currently selected transport
    pub fn get(&mut self) -> Active<'_, P, C> {
        let use_plain = self.use_plain;
        match &mut self.slot {
            Slot::Plain(plain) => Active::Plain(plain),
            Slot::Compressing(compressed) => {
                if use_plain {
                    Active::Plain(compressed.inner_mut())
                } else {
                    Active::Compressed(compressed)
                }
            }
        }
    }

    /// Select the plain (`true`) or compressing (`false`) transport
    pub fn select(&mut self, use_plain: bool) {
        if !use_plain && !self.has_compressed() {
            tracing::warn!("compressed transport selected but none installed; staying plain");
            return;
        }
        self.use_plain = use_plain;
    }

    /// The plain transport, regardless of selection
    pub fn plain_ref(&self) -> &P {
        match &self.slot {
            Slot::Plain(plain) => plain,
            Slot::Compressing(compressed) => compressed.inner(),
        }
    }

    pub fn into_inner(self) -> P {
        match self.slot {
            Slot::Plain(plain) => plain,
            Slot::Compressing(compressed) => compressed.into_inner(),
        }
    }
}

impl<P, C> BinaryReader for Active<'_, P, C>
where
    P: BinaryReader,
    C: BinaryReader,
{
    fn read_byte(&mut self) -> Result<u8> {
        match self {
            Active::Plain(t) => t.read_byte(),
            Active::Compressed(t) => t.read_byte(),
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self {
            Active::Plain(t) => t.read_exact(buf),
            Active::Compressed(t) => t.read_exact(buf),
        }
    }

    fn close(&mut self) {
        match self {
            Active::Plain(t) => t.close(),
            Active::Compressed(t) => t.close(),
        }
    }
}

impl<P, C> BinaryWriter for Active<'_, P, C>
where
    P: BinaryWriter,
    C: BinaryWriter,
{
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        match self {
            Active::Plain(t) => t.write_byte(byte),
            Active::Compressed(t) => t.write_byte(byte),
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        match self {
            Active::Plain(t) => t.write_bytes(bytes),
            Active::Compressed(t) => t.write_bytes(bytes),
        }
    }

    fn flush(&mut self, force: bool) -> Result<()> {
        match self {
            Active::Plain(t) => t.flush(force),
            Active::Compressed(t) => t.flush(force),
        }
    }

    fn close(&mut self) {
        match self {
            Active::Plain(t) => t.close(),
            Active::Compressed(t) => t.close(),
        }
    }
}
