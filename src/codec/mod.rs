//! Codec Module
//!
//! Primitive encode/decode over the switchable transport.
//!
//! ## Wire Encoding
//! ```text
//! varint      7 bits per byte, continuation bit 0x80, at most 9 bytes
//! int16/32/64 little-endian, 2/4/8 bytes
//! float32/64  IEEE-754 bit pattern, little-endian
//! bool        one byte, 0x00 or 0x01 (nonzero reads as true)
//! bytes       varint length + raw bytes
//! string      varint length + UTF-8 bytes
//! ```
//!
//! The codec never interprets packet types or column layouts; it only
//! moves exact-width values and toggles compression on request.

mod deserializer;
mod serializer;
mod varint;

pub use deserializer::BinaryDeserializer;
pub use serializer::BinarySerializer;
pub use varint::{encode_var_int, var_int_len, MAX_VAR_INT_LEN};
