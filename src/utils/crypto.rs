use ring::digest::{Context, SHA256};
use ripemd::{Digest as RipemdDigest, Ripemd160};

use crate::error::{MetahashError, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, used as the JSON-RPC request id
pub fn current_timestamp() -> Result<u64> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| MetahashError::Crypto(format!("System time error: {e}")))?;
    Ok(duration.as_secs())
}

pub fn sha256_digest(data: &[u8]) -> Vec<u8> {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    digest.as_ref().to_vec()
}

pub fn double_sha256_digest(data: &[u8]) -> Vec<u8> {
    sha256_digest(sha256_digest(data).as_slice())
}

pub fn ripemd160_digest(data: &[u8]) -> Vec<u8> {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// RIPEMD-160 over SHA-256
pub fn hash160(data: &[u8]) -> Vec<u8> {
    ripemd160_digest(sha256_digest(data).as_slice())
}

pub fn strip_hex_prefix(value: &str) -> &str {
    value.strip_prefix("0x").unwrap_or(value)
}

pub fn to_prefixed_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

/// Decode a hex string with or without the `0x` prefix
pub fn decode_hex(value: &str) -> Result<Vec<u8>> {
    let body = strip_hex_prefix(value.trim());
    if body.len() % 2 != 0 {
        return Err(MetahashError::Parse(format!(
            "Odd-length hex string ({} digits)",
            body.len()
        )));
    }
    Ok(hex::decode(body)?)
}
