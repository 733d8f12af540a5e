use crate::error::{MetahashError, Result};
use crate::utils::{decode_hex, double_sha256_digest, hash160, strip_hex_prefix, to_prefixed_hex};
use crate::wallet::keys::PublicKey;

pub const DEFAULT_NETWORK_PREFIX: u8 = 0x00;
pub const ADDRESS_CHECK_SUM_LEN: usize = 4;
pub const PUB_KEY_HASH_LEN: usize = 20;
/// prefix + hash160 + checksum
pub const ADDRESS_LEN: usize = 1 + PUB_KEY_HASH_LEN + ADDRESS_CHECK_SUM_LEN;
/// `0x` + 50 hex digits
pub const ADDRESS_TEXT_LEN: usize = 2 + ADDRESS_LEN * 2;

/// Address for a DER (or bare SEC1) public key given as hex
pub fn derive_address(public_key_hex: &str, network_prefix: u8) -> Result<String> {
    Ok(PublicKey::from_hex(public_key_hex)?.address(network_prefix))
}

/// Address for an uncompressed `04 || x || y` point
pub fn address_from_point(uncompressed_point: &[u8], network_prefix: u8) -> String {
    let pub_key_hash = hash160(uncompressed_point);
    convert_address(&pub_key_hash, network_prefix)
}

/// Address for an already computed public key hash
pub fn convert_address(pub_key_hash: &[u8], network_prefix: u8) -> String {
    let mut payload: Vec<u8> = vec![];
    payload.push(network_prefix);
    payload.extend(pub_key_hash);
    let checksum = checksum(payload.as_slice());
    payload.extend(checksum.as_slice());
    // prefix + pub_key_hash + checksum
    to_prefixed_hex(payload.as_slice())
}

fn checksum(payload: &[u8]) -> Vec<u8> {
    double_sha256_digest(payload)[0..ADDRESS_CHECK_SUM_LEN].to_vec()
}

/// Checksum validation. Malformed input is reported as `false`, never as an error.
/// Surrounding whitespace is malformed: the address is sent to nodes verbatim.
pub fn validate_address(address: &str) -> bool {
    let body = strip_hex_prefix(address);
    if body.len() % 2 != 0 {
        return false;
    }

    let payload = match hex::decode(body) {
        Ok(payload) => payload,
        Err(_) => return false,
    };

    // At least a prefix byte in front of the checksum
    if payload.len() < ADDRESS_CHECK_SUM_LEN + 1 {
        return false;
    }

    let (target, actual_checksum) = payload.split_at(payload.len() - ADDRESS_CHECK_SUM_LEN);
    checksum(target).as_slice() == actual_checksum
}

/// Cheap shape check (`0x0` prefix and full length). Does not look at the checksum.
pub fn is_address_format(address: &str) -> bool {
    address.starts_with("0x0") && address.len() == ADDRESS_TEXT_LEN
}

/// Raw address bytes: prefix, public key hash and checksum
pub fn address_to_bytes(address: &str) -> Result<Vec<u8>> {
    decode_hex(address)
}

/// Fail with `InvalidAddress` unless the checksum matches
pub fn ensure_valid_address(address: &str) -> Result<()> {
    if validate_address(address) {
        Ok(())
    } else {
        Err(MetahashError::InvalidAddress(address.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::keys::{generate_key_pair, KeyType};

    const ADDRESS: &str = "0x00fa2a5279f8f0fd2f0f9d3280ad70403f01f9d62f52373833";
    const K1_PUBLIC: &str = "0x3056301006072a8648ce3d020106052b8104000a03420004ac0925d33c19e35f2025c4738dba3b32e046e9f0d83930f7c6539fc9975adedcef18123797d7f99778e7cdd801996f88058a8e8fb1cfeadadb1bffd049907250";

    fn flip_hex_digit(c: char) -> char {
        if c == '0' {
            '1'
        } else {
            '0'
        }
    }

    #[test]
    fn test_known_addresses_validate() {
        assert!(validate_address(ADDRESS));
        assert!(validate_address(
            "0x0033626a3977271fd3d1c47e05e3f34c69f38661bdebacad65"
        ));
        assert!(validate_address(
            "00fa2a5279f8f0fd2f0f9d3280ad70403f01f9d62f52373833"
        ));
    }

    #[test]
    fn test_single_digit_flip_is_rejected() {
        for i in 2..ADDRESS.len() {
            let mut chars: Vec<char> = ADDRESS.chars().collect();
            chars[i] = flip_hex_digit(chars[i]);
            let mutated: String = chars.into_iter().collect();
            assert!(!validate_address(&mutated), "flip at {i} accepted");
        }
    }

    #[test]
    fn test_malformed_addresses_are_false() {
        assert!(!validate_address("0x00fa2a5279f8f0fd2f0f9d3280ad70403f01f9d62f5237383"));
        assert!(!validate_address("0x"));
        assert!(!validate_address(""));
        assert!(!validate_address("0xzz2a5279f8f0fd2f0f9d3280ad70403f01f9d62f52373833"));
        assert!(!validate_address("0x52373833"));
    }

    #[test]
    fn test_surrounding_whitespace_is_rejected() {
        assert!(!validate_address(&format!("  {ADDRESS}\n")));
        assert!(!validate_address(&format!("{ADDRESS} ")));
        assert!(matches!(
            ensure_valid_address(&format!(" {ADDRESS}")),
            Err(MetahashError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_derive_address_from_der_public_key() {
        let address = derive_address(K1_PUBLIC, DEFAULT_NETWORK_PREFIX).unwrap();
        assert_eq!(address, "0x00e327ebc4691ae115a7146384732308d8bc11280e3922aa44");
        assert_eq!(
            derive_address(K1_PUBLIC, DEFAULT_NETWORK_PREFIX).unwrap(),
            address
        );
    }

    #[test]
    fn test_custom_network_prefix() {
        let address = derive_address(K1_PUBLIC, 0x01).unwrap();
        assert!(address.starts_with("0x01e327ebc4691ae115a7146384732308d8bc11280e"));
        assert!(validate_address(&address));
        assert_ne!(
            address,
            derive_address(K1_PUBLIC, DEFAULT_NETWORK_PREFIX).unwrap()
        );
    }

    #[test]
    fn test_derived_addresses_always_validate() {
        for key_type in [KeyType::Secp256r1, KeyType::Secp256k1] {
            for _ in 0..8 {
                let pair = generate_key_pair(key_type).unwrap();
                let address = derive_address(pair.get_public_key(), DEFAULT_NETWORK_PREFIX).unwrap();
                assert_eq!(address, pair.get_address());
                assert!(is_address_format(&address));
                assert!(validate_address(&address));
            }
        }
    }

    #[test]
    fn test_address_bytes_and_format() {
        let bytes = address_to_bytes(ADDRESS).unwrap();
        assert_eq!(bytes.len(), ADDRESS_LEN);
        assert_eq!(bytes[0], 0x00);
        assert!(is_address_format(ADDRESS));
        assert!(!is_address_format("0x1fa2a5279f8f0fd2f0f9d3280ad70403f01f9d62f52373833"));
        assert!(ensure_valid_address(ADDRESS).is_ok());
        assert!(matches!(
            ensure_valid_address("0x00fa2a5279f8f0fd2f0f9d3280ad70403f01f9d62f52373834"),
            Err(MetahashError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_convert_address_matches_point_derivation() {
        let pub_key_hash = hash160(&[0x04; 65]);
        assert_eq!(
            convert_address(&pub_key_hash, DEFAULT_NETWORK_PREFIX),
            address_from_point(&[0x04; 65], DEFAULT_NETWORK_PREFIX)
        );
    }
}
