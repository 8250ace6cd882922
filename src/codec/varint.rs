//! Variable-length unsigned integers
//!
//! Bytes 1-8 carry 7 payload bits each and flag continuation with 0x80.
//! The 9th byte, when present, carries the remaining 8 bits in full and
//! has no continuation flag, so every u64 fits in 9 bytes. Values below
//! 2^56 encode exactly like LEB128.

use crate::error::Result;

/// Maximum encoded length of a varint
pub const MAX_VAR_INT_LEN: usize = 9;

/// Encode `value` into `out`, returning the number of bytes used
pub fn encode_var_int(mut value: u64, out: &mut [u8; MAX_VAR_INT_LEN]) -> usize {
    for (i, slot) in out.iter_mut().enumerate() {
        if i == MAX_VAR_INT_LEN - 1 {
            // Only 8 bits remain after 56 have been emitted
            *slot = value as u8;
            return MAX_VAR_INT_LEN;
        }

        let mut byte = (value & 0x7F) as u8;
        if value > 0x7F {
            byte |= 0x80;
        }
        *slot = byte;

        value >>= 7;
        if value == 0 {
            return i + 1;
        }
    }
    MAX_VAR_INT_LEN
}

/// Number of bytes `value` occupies on the wire
pub fn var_int_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).clamp(1, MAX_VAR_INT_LEN)
}

/// Decode a varint, pulling bytes from `next_byte` one at a time
pub(crate) fn decode_var_int<F>(mut next_byte: F) -> Result<u64>
where
    F: FnMut() -> Result<u8>,
{
    let mut number = 0u64;
    for i in 0..MAX_VAR_INT_LEN {
        let byte = next_byte()?;

        if i == MAX_VAR_INT_LEN - 1 {
            number |= (byte as u64) << 56;
            break;
        }

        number |= ((byte & 0x7F) as u64) << (7 * i);
        if byte & 0x80 == 0 {
            break;
        }
    }
    Ok(number)
}
