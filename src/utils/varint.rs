//! Variable-width unsigned integers as used in signed transaction payloads
//!
//! Values below 250 are stored as a single byte. Larger values are a marker
//! byte followed by the little-endian value: 250 for 2 bytes, 251 for 4 bytes
//! and 252 for 8 bytes. Every value has exactly one valid encoding.

use crate::error::{MetahashError, Result};

pub const MARKER_U16: u8 = 250;
pub const MARKER_U32: u8 = 251;
pub const MARKER_U64: u8 = 252;

/// Encode an unsigned value in its canonical form
pub fn encode_var_uint(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(value));
    if value < MARKER_U16 as u64 {
        out.push(value as u8);
    } else if value <= u16::MAX as u64 {
        out.push(MARKER_U16);
        out.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= u32::MAX as u64 {
        out.push(MARKER_U32);
        out.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        out.push(MARKER_U64);
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

/// Encode any integer, rejecting negative values and values that do not fit
/// in 64 bits
pub fn encode_integer<T>(value: T) -> Result<Vec<u8>>
where
    T: TryInto<u64> + Copy + std::fmt::Display,
{
    let unsigned: u64 = value
        .try_into()
        .map_err(|_| MetahashError::Encoding(format!("{value} is not a 64-bit unsigned value")))?;
    Ok(encode_var_uint(unsigned))
}

/// Number of bytes `encode_var_uint(value)` produces
pub fn encoded_len(value: u64) -> usize {
    if value < MARKER_U16 as u64 {
        1
    } else if value <= u16::MAX as u64 {
        3
    } else if value <= u32::MAX as u64 {
        5
    } else {
        9
    }
}

/// Decode a value from the front of `bytes`, returning it with the number of
/// bytes consumed
pub fn decode_var_uint(bytes: &[u8]) -> Result<(u64, usize)> {
    let marker = *bytes
        .first()
        .ok_or_else(|| MetahashError::Encoding("Empty var-uint input".to_string()))?;

    let (value, consumed) = match marker {
        MARKER_U16 => (u16::from_le_bytes(read_fixed(bytes)?) as u64, 3),
        MARKER_U32 => (u32::from_le_bytes(read_fixed(bytes)?) as u64, 5),
        MARKER_U64 => (u64::from_le_bytes(read_fixed(bytes)?), 9),
        m if m < MARKER_U16 => (m as u64, 1),
        m => {
            return Err(MetahashError::Encoding(format!(
                "Unsupported var-uint marker {m}"
            )))
        }
    };

    if encoded_len(value) != consumed {
        return Err(MetahashError::Encoding(format!(
            "Non-canonical var-uint: {value} stored in {consumed} bytes"
        )));
    }
    Ok((value, consumed))
}

fn read_fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    bytes
        .get(1..1 + N)
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| {
            MetahashError::Encoding(format!(
                "Truncated var-uint: expected {N} bytes after marker, found {}",
                bytes.len().saturating_sub(1)
            ))
        })
}
