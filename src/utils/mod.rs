//! Utility functions and helpers
//!
//! Hashing primitives, hex helpers and the variable-width integer codec
//! used when building signed transaction payloads.

pub mod crypto;
pub mod varint;

pub use crypto::{
    current_timestamp, decode_hex, double_sha256_digest, hash160, ripemd160_digest,
    sha256_digest, strip_hex_prefix, to_prefixed_hex,
};

pub use varint::{decode_var_uint, encode_integer, encode_var_uint, encoded_len};
