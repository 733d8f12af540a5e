//! Key generation, public key derivation, signing and verification
//!
//! Private keys travel as `0x`-prefixed SEC1 DER (`ECPrivateKey`) hex and
//! public keys as `0x`-prefixed `SubjectPublicKeyInfo` DER hex, the formats
//! MetaHash wallets export. The curve is detected from the DER parameters, so
//! callers only choose a [`KeyType`] when generating new keys.

use crate::error::{MetahashError, Result};
use crate::utils::{decode_hex, to_prefixed_hex};
use crate::wallet::address::{address_from_point, DEFAULT_NETWORK_PREFIX};
use k256::Secp256k1;
use p256::ecdsa::signature::{RandomizedSigner, Signer, Verifier};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::{AssociatedOid, DecodePrivateKey, DecodePublicKey, EncodePublicKey};
use p256::NistP256;
use rand::rngs::OsRng;
use sec1::der::{Decode, Encode};
use sec1::{EcParameters, EcPrivateKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::{ZeroizeOnDrop, Zeroizing};

/// Elliptic curve a key pair lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    /// NIST P-256, the network default
    #[default]
    Secp256r1,
    Secp256k1,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Secp256r1 => "secp256r1",
            KeyType::Secp256k1 => "secp256k1",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = MetahashError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "secp256r1" | "p256" | "prime256v1" | "r1" => Ok(KeyType::Secp256r1),
            "secp256k1" | "k256" | "k1" => Ok(KeyType::Secp256k1),
            other => Err(MetahashError::Config(format!(
                "Unknown key type: {other}. Valid options: secp256r1, secp256k1"
            ))),
        }
    }
}

/// A parsed private key on one of the supported curves
#[derive(Clone)]
pub enum SecretKey {
    Secp256r1(p256::SecretKey),
    Secp256k1(k256::SecretKey),
}

impl SecretKey {
    pub fn generate(key_type: KeyType) -> Self {
        match key_type {
            KeyType::Secp256r1 => SecretKey::Secp256r1(p256::SecretKey::random(&mut OsRng)),
            KeyType::Secp256k1 => SecretKey::Secp256k1(k256::SecretKey::random(&mut OsRng)),
        }
    }

    /// Parse a SEC1 or PKCS#8 DER private key given as hex
    pub fn from_hex(private_key_hex: &str) -> Result<Self> {
        let der = decode_hex(private_key_hex)?;
        if let Ok(ec_key) = EcPrivateKey::from_der(&der) {
            return Self::from_ec_private_key(ec_key);
        }
        if let Ok(key) = p256::SecretKey::from_pkcs8_der(&der) {
            return Ok(SecretKey::Secp256r1(key));
        }
        if let Ok(key) = k256::SecretKey::from_pkcs8_der(&der) {
            return Ok(SecretKey::Secp256k1(key));
        }
        Err(MetahashError::Parse(
            "Private key is not a secp256r1/secp256k1 DER key".to_string(),
        ))
    }

    fn from_ec_private_key(ec_key: EcPrivateKey<'_>) -> Result<Self> {
        let invalid =
            |e: sec1::der::Error| MetahashError::Parse(format!("Invalid SEC1 private key: {e}"));
        match ec_key.parameters.and_then(|params| params.named_curve()) {
            Some(oid) if oid == NistP256::OID => Ok(SecretKey::Secp256r1(
                p256::SecretKey::try_from(ec_key).map_err(invalid)?,
            )),
            Some(oid) if oid == Secp256k1::OID => Ok(SecretKey::Secp256k1(
                k256::SecretKey::try_from(ec_key).map_err(invalid)?,
            )),
            Some(oid) => Err(MetahashError::Parse(format!(
                "Unsupported private key curve {oid}"
            ))),
            // No curve OID: the embedded public key has to match the curve
            None => p256::SecretKey::try_from(ec_key.clone())
                .map(SecretKey::Secp256r1)
                .or_else(|_| k256::SecretKey::try_from(ec_key).map(SecretKey::Secp256k1))
                .map_err(invalid),
        }
    }

    pub fn key_type(&self) -> KeyType {
        match self {
            SecretKey::Secp256r1(_) => KeyType::Secp256r1,
            SecretKey::Secp256k1(_) => KeyType::Secp256k1,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        match self {
            SecretKey::Secp256r1(key) => PublicKey::Secp256r1(key.public_key()),
            SecretKey::Secp256k1(key) => PublicKey::Secp256k1(key.public_key()),
        }
    }

    /// SEC1 DER encoding with the named-curve OID and public key embedded
    pub fn to_hex(&self) -> Result<String> {
        let (scalar, curve) = match self {
            SecretKey::Secp256r1(key) => (Zeroizing::new(key.to_bytes().to_vec()), NistP256::OID),
            SecretKey::Secp256k1(key) => (Zeroizing::new(key.to_bytes().to_vec()), Secp256k1::OID),
        };
        let point = self.public_key().uncompressed_point();
        let der = EcPrivateKey {
            private_key: scalar.as_slice(),
            parameters: Some(EcParameters::NamedCurve(curve)),
            public_key: Some(point.as_slice()),
        }
        .to_der()
        .map_err(|e| MetahashError::Crypto(format!("Failed to encode private key: {e}")))?;
        Ok(to_prefixed_hex(&Zeroizing::new(der)))
    }

    /// ECDSA over SHA-256 of `message`, DER encoded
    pub fn sign(&self, message: &[u8], deterministic: bool) -> Result<Vec<u8>> {
        let sign_error =
            |e: p256::ecdsa::Error| MetahashError::Crypto(format!("Failed to sign message: {e}"));
        let der = match self {
            SecretKey::Secp256r1(key) => {
                let signing_key = p256::ecdsa::SigningKey::from(key);
                let signature: p256::ecdsa::Signature = if deterministic {
                    signing_key.try_sign(message).map_err(sign_error)?
                } else {
                    signing_key
                        .try_sign_with_rng(&mut OsRng, message)
                        .map_err(sign_error)?
                };
                signature.to_der().as_bytes().to_vec()
            }
            SecretKey::Secp256k1(key) => {
                let signing_key = k256::ecdsa::SigningKey::from(key);
                let signature: k256::ecdsa::Signature = if deterministic {
                    signing_key.try_sign(message).map_err(sign_error)?
                } else {
                    signing_key
                        .try_sign_with_rng(&mut OsRng, message)
                        .map_err(sign_error)?
                };
                signature.to_der().as_bytes().to_vec()
            }
        };
        Ok(der)
    }
}

/// A parsed public key on one of the supported curves
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    Secp256r1(p256::PublicKey),
    Secp256k1(k256::PublicKey),
}

impl PublicKey {
    /// Parse a `SubjectPublicKeyInfo` DER key, or a bare SEC1 point, given as hex
    pub fn from_hex(public_key_hex: &str) -> Result<Self> {
        let der = decode_hex(public_key_hex)?;
        if let Ok(key) = p256::PublicKey::from_public_key_der(&der) {
            return Ok(PublicKey::Secp256r1(key));
        }
        if let Ok(key) = k256::PublicKey::from_public_key_der(&der) {
            return Ok(PublicKey::Secp256k1(key));
        }
        // A bare point is ambiguous between curves; P-256 wins as the default
        if let Ok(key) = p256::PublicKey::from_sec1_bytes(&der) {
            return Ok(PublicKey::Secp256r1(key));
        }
        if let Ok(key) = k256::PublicKey::from_sec1_bytes(&der) {
            return Ok(PublicKey::Secp256k1(key));
        }
        Err(MetahashError::Parse(
            "Public key is not a valid secp256r1/secp256k1 point".to_string(),
        ))
    }

    pub fn key_type(&self) -> KeyType {
        match self {
            PublicKey::Secp256r1(_) => KeyType::Secp256r1,
            PublicKey::Secp256k1(_) => KeyType::Secp256k1,
        }
    }

    /// `04 || x || y` with both coordinates padded to 32 bytes
    pub fn uncompressed_point(&self) -> Vec<u8> {
        match self {
            PublicKey::Secp256r1(key) => key.to_encoded_point(false).as_bytes().to_vec(),
            PublicKey::Secp256k1(key) => key.to_encoded_point(false).as_bytes().to_vec(),
        }
    }

    pub fn to_hex(&self) -> Result<String> {
        let document = match self {
            PublicKey::Secp256r1(key) => key.to_public_key_der(),
            PublicKey::Secp256k1(key) => key.to_public_key_der(),
        }
        .map_err(|e| MetahashError::Crypto(format!("Failed to encode public key: {e}")))?;
        Ok(to_prefixed_hex(document.as_bytes()))
    }

    pub fn address(&self, network_prefix: u8) -> String {
        address_from_point(&self.uncompressed_point(), network_prefix)
    }

    /// Check a DER signature. A malformed signature is an error, a well-formed
    /// signature that does not match is `Ok(false)`.
    pub fn verify(&self, signature_der: &[u8], message: &[u8]) -> Result<bool> {
        let parse_error =
            |e: p256::ecdsa::Error| MetahashError::Parse(format!("Malformed DER signature: {e}"));
        let valid = match self {
            PublicKey::Secp256r1(key) => {
                let signature =
                    p256::ecdsa::Signature::from_der(signature_der).map_err(parse_error)?;
                p256::ecdsa::VerifyingKey::from(key)
                    .verify(message, &signature)
                    .is_ok()
            }
            PublicKey::Secp256k1(key) => {
                let signature =
                    k256::ecdsa::Signature::from_der(signature_der).map_err(parse_error)?;
                // secp256k1 verification only accepts low-S signatures
                let signature = signature.normalize_s().unwrap_or(signature);
                k256::ecdsa::VerifyingKey::from(key)
                    .verify(message, &signature)
                    .is_ok()
            }
        };
        Ok(valid)
    }
}

/// Freshly generated or imported key material with its address
#[derive(Clone, Serialize, Deserialize, ZeroizeOnDrop)]
pub struct KeyPair {
    #[serde(rename = "private")]
    private_key: String,
    #[serde(rename = "public")]
    public_key: String,
    address: String,
    #[serde(skip)]
    #[zeroize(skip)]
    key_type: KeyType,
}

impl KeyPair {
    pub fn generate(key_type: KeyType) -> Result<KeyPair> {
        Self::from_secret(&SecretKey::generate(key_type), DEFAULT_NETWORK_PREFIX)
    }

    pub fn from_private_key(private_key_hex: &str, network_prefix: u8) -> Result<KeyPair> {
        Self::from_secret(&SecretKey::from_hex(private_key_hex)?, network_prefix)
    }

    fn from_secret(secret: &SecretKey, network_prefix: u8) -> Result<KeyPair> {
        let public = secret.public_key();
        Ok(KeyPair {
            private_key: secret.to_hex()?,
            public_key: public.to_hex()?,
            address: public.address(network_prefix),
            key_type: secret.key_type(),
        })
    }

    pub fn get_private_key(&self) -> &str {
        &self.private_key
    }

    pub fn get_public_key(&self) -> &str {
        &self.public_key
    }

    pub fn get_address(&self) -> &str {
        &self.address
    }

    pub fn get_key_type(&self) -> KeyType {
        self.key_type
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("address", &self.address)
            .field("key_type", &self.key_type)
            .finish_non_exhaustive()
    }
}

pub fn generate_key_pair(key_type: KeyType) -> Result<KeyPair> {
    KeyPair::generate(key_type)
}

pub fn derive_public_key(private_key_hex: &str) -> Result<String> {
    SecretKey::from_hex(private_key_hex)?.public_key().to_hex()
}

/// Sign `message` with a DER private key; RFC 6979 nonces unless
/// `deterministic` is false
pub fn sign(message: &[u8], private_key_hex: &str, deterministic: bool) -> Result<String> {
    let signature = SecretKey::from_hex(private_key_hex)?.sign(message, deterministic)?;
    Ok(to_prefixed_hex(&signature))
}

pub fn verify(signature_hex: &str, message: &[u8], public_key_hex: &str) -> Result<bool> {
    let public = PublicKey::from_hex(public_key_hex)?;
    let signature = decode_hex(signature_hex)?;
    public.verify(&signature, message)
}

/// Boolean form of [`verify`]: any parse failure counts as an invalid signature
pub fn is_valid_signature(signature_hex: &str, message: &[u8], public_key_hex: &str) -> bool {
    verify(signature_hex, message, public_key_hex).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::address::validate_address;

    // secp256k1 key exported by a MetaHash wallet, with its known address
    const K1_PRIVATE: &str = "30740201010420f882269a823c7a1721a0b0b1b7c2de2f9c13a744ef7c8b7dd3a95a09b421b277a00706052b8104000aa14403420004ac0925d33c19e35f2025c4738dba3b32e046e9f0d83930f7c6539fc9975adedcef18123797d7f99778e7cdd801996f88058a8e8fb1cfeadadb1bffd049907250";
    const K1_PUBLIC: &str = "0x3056301006072a8648ce3d020106052b8104000a03420004ac0925d33c19e35f2025c4738dba3b32e046e9f0d83930f7c6539fc9975adedcef18123797d7f99778e7cdd801996f88058a8e8fb1cfeadadb1bffd049907250";
    const K1_ADDRESS: &str = "0x00e327ebc4691ae115a7146384732308d8bc11280e3922aa44";

    // RFC 6979 A.2.5 P-256 key
    const R1_PRIVATE: &str = "0x30770201010420c9afa9d845ba75166b5c215767b1d6934e50c3db36e89b127b8a622b120f6721a00a06082a8648ce3d030107a1440342000460fed4ba255a9d31c961eb74c6356d68c049b8923b61fa6ce669622e60f29fb67903fe1008b8bc99a41ae9e95628bc64f2f1b20c2d7e9f5177a3c294d4462299";
    const R1_PUBLIC: &str = "0x3059301306072a8648ce3d020106082a8648ce3d0301070342000460fed4ba255a9d31c961eb74c6356d68c049b8923b61fa6ce669622e60f29fb67903fe1008b8bc99a41ae9e95628bc64f2f1b20c2d7e9f5177a3c294d4462299";
    const R1_ADDRESS: &str = "0x00ea3199e43a48a8b726ce41ef42e09b572f9933067445f707";
    const R1_SAMPLE_SIGNATURE: &str = "0x3046022100efd48b2aacb6a8fd1140dd9cd45e81d69d2c877b56aaf991c34d0ea84eaf3716022100f7cb1c942d657c41d436c7a1b6e29f65f3e900dbb9aff4064dc4ab2f843acda8";

    #[test]
    fn test_derive_public_key_secp256k1() {
        assert_eq!(derive_public_key(K1_PRIVATE).unwrap(), K1_PUBLIC);
    }

    #[test]
    fn test_import_known_wallets() {
        let k1 = KeyPair::from_private_key(K1_PRIVATE, DEFAULT_NETWORK_PREFIX).unwrap();
        assert_eq!(k1.get_key_type(), KeyType::Secp256k1);
        assert_eq!(k1.get_address(), K1_ADDRESS);

        let r1 = KeyPair::from_private_key(R1_PRIVATE, DEFAULT_NETWORK_PREFIX).unwrap();
        assert_eq!(r1.get_key_type(), KeyType::Secp256r1);
        assert_eq!(r1.get_public_key(), R1_PUBLIC);
        assert_eq!(r1.get_address(), R1_ADDRESS);
    }

    #[test]
    fn test_rfc6979_deterministic_signature() {
        let signature = sign(b"sample", R1_PRIVATE, true).unwrap();
        assert_eq!(signature, R1_SAMPLE_SIGNATURE);
        assert!(verify(&signature, b"sample", R1_PUBLIC).unwrap());
    }

    #[test]
    fn test_deterministic_signing_is_repeatable() {
        let first = sign(b"payload", K1_PRIVATE, true).unwrap();
        let second = sign(b"payload", K1_PRIVATE, true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sign_verify_fresh_keys() {
        for key_type in [KeyType::Secp256r1, KeyType::Secp256k1] {
            let pair = generate_key_pair(key_type).unwrap();
            assert_eq!(pair.get_key_type(), key_type);
            assert!(validate_address(pair.get_address()));
            assert_eq!(
                derive_public_key(pair.get_private_key()).unwrap(),
                pair.get_public_key()
            );

            let message = b"transfer 100 to somebody".to_vec();
            for deterministic in [true, false] {
                let signature = sign(&message, pair.get_private_key(), deterministic).unwrap();
                assert!(verify(&signature, &message, pair.get_public_key()).unwrap());

                let mut tampered = message.clone();
                tampered[0] ^= 0x01;
                assert!(!verify(&signature, &tampered, pair.get_public_key()).unwrap());
            }
        }
    }

    #[test]
    fn test_verify_with_wrong_key_is_false() {
        let signature = sign(b"sample", R1_PRIVATE, true).unwrap();
        let other = generate_key_pair(KeyType::Secp256r1).unwrap();
        assert!(!verify(&signature, b"sample", other.get_public_key()).unwrap());
    }

    #[test]
    fn test_malformed_inputs_are_parse_errors() {
        assert!(matches!(
            derive_public_key("0x3074"),
            Err(MetahashError::Parse(_))
        ));
        assert!(matches!(
            derive_public_key("0xabc"),
            Err(MetahashError::Parse(_))
        ));
        assert!(matches!(
            verify("0x3006020101", b"sample", R1_PUBLIC),
            Err(MetahashError::Parse(_))
        ));
        assert!(matches!(
            verify(R1_SAMPLE_SIGNATURE, b"sample", "0x04ffff"),
            Err(MetahashError::Parse(_))
        ));
    }

    #[test]
    fn test_boolean_wrapper_never_errors() {
        assert!(is_valid_signature(R1_SAMPLE_SIGNATURE, b"sample", R1_PUBLIC));
        assert!(!is_valid_signature("0xzz", b"sample", R1_PUBLIC));
        assert!(!is_valid_signature(R1_SAMPLE_SIGNATURE, b"sample", "nope"));
    }

    #[test]
    fn test_key_type_parsing() {
        assert_eq!("secp256k1".parse::<KeyType>().unwrap(), KeyType::Secp256k1);
        assert_eq!("P256".parse::<KeyType>().unwrap(), KeyType::Secp256r1);
        assert!("ed25519".parse::<KeyType>().is_err());
        assert_eq!(KeyType::default(), KeyType::Secp256r1);
    }

    #[test]
    fn test_key_pair_json_shape() {
        let pair = KeyPair::from_private_key(K1_PRIVATE, DEFAULT_NETWORK_PREFIX).unwrap();
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["address"], K1_ADDRESS);
        assert_eq!(json["public"], K1_PUBLIC);
        assert!(json["private"].as_str().unwrap().starts_with("0x3074"));
        assert!(!format!("{pair:?}").contains("f882269a"));
    }

    #[test]
    fn test_private_key_export_keeps_curve_oid() {
        let k1 = KeyPair::from_private_key(K1_PRIVATE, DEFAULT_NETWORK_PREFIX).unwrap();
        assert_eq!(k1.get_private_key(), format!("0x{K1_PRIVATE}"));
        let r1 = KeyPair::from_private_key(R1_PRIVATE, DEFAULT_NETWORK_PREFIX).unwrap();
        assert_eq!(r1.get_private_key(), R1_PRIVATE);

        let generated = generate_key_pair(KeyType::Secp256r1).unwrap();
        assert!(generated.get_private_key().starts_with("0x3077"));
        assert!(generated.get_private_key().contains("a00a06082a8648ce3d030107"));
        let generated = generate_key_pair(KeyType::Secp256k1).unwrap();
        assert!(generated.get_private_key().starts_with("0x3074"));
        assert!(generated.get_private_key().contains("a00706052b8104000a"));
    }

    #[test]
    fn test_private_key_without_curve_oid() {
        // Same k1 key, parameters field removed
        let bare = "306b0201010420f882269a823c7a1721a0b0b1b7c2de2f9c13a744ef7c8b7dd3a95a09b421b277a14403420004ac0925d33c19e35f2025c4738dba3b32e046e9f0d83930f7c6539fc9975adedcef18123797d7f99778e7cdd801996f88058a8e8fb1cfeadadb1bffd049907250";
        let secret = SecretKey::from_hex(bare).unwrap();
        assert_eq!(secret.key_type(), KeyType::Secp256k1);
        assert_eq!(secret.to_hex().unwrap(), format!("0x{K1_PRIVATE}"));
    }
}
