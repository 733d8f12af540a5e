//! Transfer transactions: the signed byte layout and the `mhc_send` fields
//!
//! The network verifies a signature over
//! `to || varint(value) || varint(fee) || varint(nonce) || varint(len(data)) || data`
//! where `to` is the full 25-byte address (prefix and checksum included) and
//! every integer uses the variable-width encoding from [`crate::utils::varint`].

use crate::error::{MetahashError, Result};
use crate::utils::{decode_hex, encode_var_uint, strip_hex_prefix};
use crate::wallet::{address_to_bytes, ensure_valid_address, SecretKey};
use log::debug;
use serde::{Deserialize, Serialize};

/// Parameters of an `mhc_send` call. Numbers travel as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxFields {
    pub to: String,
    pub value: String,
    pub fee: String,
    pub nonce: String,
    pub data: String,
    pub pubkey: String,
    pub sign: String,
}

/// Byte sequence that gets hashed and signed for a transfer
pub fn build_signable_payload(
    to_address: &str,
    value: u64,
    fee: u64,
    nonce: u64,
    data_hex: &str,
) -> Result<Vec<u8>> {
    let data_hex = strip_hex_prefix(data_hex);
    if data_hex.len() % 2 != 0 {
        return Err(MetahashError::Encoding(format!(
            "Transaction data must be whole bytes, got {} hex digits",
            data_hex.len()
        )));
    }
    let data = decode_hex(data_hex)?;

    let mut payload = address_to_bytes(to_address)?;
    payload.extend(encode_var_uint(value));
    payload.extend(encode_var_uint(fee));
    payload.extend(encode_var_uint(nonce));
    payload.extend(encode_var_uint(data.len() as u64));
    payload.extend(data);
    Ok(payload)
}

/// Build, sign and package a transfer ready for the proxy node
pub fn assemble_transaction(
    private_key_hex: &str,
    to_address: &str,
    value: u64,
    fee: u64,
    nonce: u64,
    data: &str,
) -> Result<TxFields> {
    ensure_valid_address(to_address)?;

    let secret = SecretKey::from_hex(private_key_hex)?;
    let data_hex = hex::encode(data.as_bytes());
    let payload = build_signable_payload(to_address, value, fee, nonce, &data_hex)?;
    let signature = secret.sign(&payload, true)?;

    debug!(
        "Signed transfer to {to_address}: value={value} fee={fee} nonce={nonce} payload={} bytes",
        payload.len()
    );

    Ok(TxFields {
        to: to_address.to_string(),
        value: value.to_string(),
        fee: fee.to_string(),
        nonce: nonce.to_string(),
        data: data_hex,
        pubkey: secret.public_key().to_hex()?,
        sign: crate::utils::to_prefixed_hex(&signature),
    })
}

impl TxFields {
    /// Re-create the signed payload from the wire fields
    pub fn signable_payload(&self) -> Result<Vec<u8>> {
        build_signable_payload(
            &self.to,
            parse_amount("value", &self.value)?,
            parse_amount("fee", &self.fee)?,
            parse_amount("nonce", &self.nonce)?,
            &self.data,
        )
    }

    /// Check `sign` against `pubkey` over the payload these fields describe
    pub fn verify_signature(&self) -> Result<bool> {
        let payload = self.signable_payload()?;
        crate::wallet::verify(&self.sign, &payload, &self.pubkey)
    }
}

fn parse_amount(field: &str, value: &str) -> Result<u64> {
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse::<u64>()
        .map_err(|e| MetahashError::Parse(format!("Invalid {field} '{value}': {e}")))
}

/// `data` command that delegates `value` to the destination node
pub fn delegate_command(value: u64) -> String {
    serde_json::json!({
        "method": "delegate",
        "params": { "value": value.to_string() },
    })
    .to_string()
}

/// `data` command that withdraws a delegation from the destination node
pub fn undelegate_command() -> String {
    serde_json::json!({ "method": "undelegate" }).to_string()
}
