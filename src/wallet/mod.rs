//! Key management and address handling
//!
//! This module handles key generation, signing, and the checksummed
//! hex addresses the network uses to identify accounts.

pub mod address;
pub mod keys;

pub use address::{
    address_from_point, address_to_bytes, convert_address, derive_address, ensure_valid_address,
    is_address_format, validate_address, ADDRESS_CHECK_SUM_LEN, ADDRESS_LEN, ADDRESS_TEXT_LEN,
    DEFAULT_NETWORK_PREFIX,
};
pub use keys::{
    derive_public_key, generate_key_pair, is_valid_signature, sign, verify, KeyPair, KeyType,
    PublicKey, SecretKey,
};
