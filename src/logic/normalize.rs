//! Metadata normalisation around engine calls
//!
//! Engines disagree with the standard API about name casing, key usages and
//! a few JWK members. These functions fix inputs on the way in and results on
//! the way out so callers always see the standard shape.

use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use tracing::debug;

use crate::error::{FormatError, ShimResult};
use crate::model::{
    Algorithm, CryptoKey, GeneratedKey, HashAlgorithm, JsonWebKey, KeyData, KeyFormat, KeyType,
    KeyUsage,
};

/// base64url, tolerant of trailing padding
const B64U: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// JWK `alg` values some engines emit for EC keys; not valid JWK output
const NON_STANDARD_EC_ALGS: [&str; 3] = ["EC-256", "EC-384", "EC-521"];

/// Canonical casing of an algorithm name
///
/// Upper-cases the name, except `RSASSA-PKCS1-v1_5` whose mixed case is
/// mandated by the standard.
pub fn standardize_algorithm_name(name: &str) -> String {
    let upper = name.to_uppercase();
    if upper == "RSASSA-PKCS1-V1_5" {
        "RSASSA-PKCS1-v1_5".to_string()
    } else {
        upper
    }
}

/// Copy of `algorithm` with the name and hash name lower-cased
pub fn engine_descriptor(algorithm: &Algorithm) -> Algorithm {
    let mut lowered = algorithm.clone();
    lowered.name = algorithm.name.to_lowercase();
    lowered.hash = algorithm
        .hash
        .as_ref()
        .map(|hash| HashAlgorithm::new(hash.name.to_lowercase()));
    lowered
}

/// Usages implied by a key's type
pub fn usages_for(key_type: KeyType) -> Vec<KeyUsage> {
    match key_type {
        KeyType::Secret => vec![KeyUsage::Sign, KeyUsage::Verify],
        KeyType::Private => vec![KeyUsage::Sign],
        KeyType::Public => vec![KeyUsage::Verify],
    }
}

fn canonicalize(key: &mut CryptoKey) {
    key.algorithm.name = standardize_algorithm_name(&key.algorithm.name);
}

pub fn normalize_generated(generated: GeneratedKey) -> GeneratedKey {
    match generated {
        GeneratedKey::Pair(mut pair) => {
            pair.public_key.usages = vec![KeyUsage::Verify];
            canonicalize(&mut pair.public_key);
            pair.private_key.usages = vec![KeyUsage::Sign];
            canonicalize(&mut pair.private_key);
            GeneratedKey::Pair(pair)
        }
        GeneratedKey::Secret(mut key) => {
            key.usages = vec![KeyUsage::Sign, KeyUsage::Verify];
            canonicalize(&mut key);
            GeneratedKey::Secret(key)
        }
    }
}

fn decode_member(member: &'static str, value: Option<&String>) -> Result<Vec<u8>, FormatError> {
    let value = value.ok_or(FormatError::MissingMember { member })?;
    B64U.decode(value)
        .map_err(|e| FormatError::InvalidBase64Url {
            member,
            reason: e.to_string(),
        })
}

fn modulus_bits(bytes: usize) -> Result<u32, FormatError> {
    bytes
        .checked_mul(8)
        .and_then(|bits| u32::try_from(bits).ok())
        .ok_or(FormatError::ModulusTooLarge { bytes })
}

/// Fix metadata on a freshly imported key
///
/// RSA keys imported from a JWK get `modulus_length` and `public_exponent`
/// recomputed from `n` and `e`, since engines leave them unset.
pub fn normalize_imported(
    mut key: CryptoKey,
    format: KeyFormat,
    key_data: &KeyData,
) -> ShimResult<CryptoKey> {
    canonicalize(&mut key);
    key.usages = usages_for(key.key_type);

    if let (KeyFormat::Jwk, KeyData::Jwk(jwk)) = (format, key_data) {
        if jwk.is_rsa() {
            let modulus = decode_member("n", jwk.n.as_ref())?;
            let exponent = decode_member("e", jwk.e.as_ref())?;
            let modulus_length = modulus_bits(modulus.len())?;
            key.algorithm.modulus_length = Some(modulus_length);
            key.algorithm.public_exponent = Some(exponent);
            debug!(modulus_length, "recomputed RSA parameters from JWK");
        }
    }
    Ok(key)
}

fn normalize_jwk(mut jwk: JsonWebKey) -> JsonWebKey {
    if jwk.is_rsa() || jwk.is_ec() {
        let op = if jwk.has_private_exponent() {
            KeyUsage::Sign
        } else {
            KeyUsage::Verify
        };
        jwk.key_ops = Some(vec![op.as_str().to_string()]);
    }
    if jwk
        .alg
        .as_deref()
        .is_some_and(|alg| NON_STANDARD_EC_ALGS.contains(&alg))
    {
        jwk.alg = None;
    }
    jwk
}

pub fn normalize_exported(data: KeyData) -> KeyData {
    match data {
        KeyData::Jwk(jwk) => KeyData::Jwk(normalize_jwk(jwk)),
        bytes => bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{KeyAlgorithm, KeyMaterial};

    fn key(key_type: KeyType, name: &str) -> CryptoKey {
        CryptoKey {
            key_type,
            extractable: true,
            algorithm: KeyAlgorithm::new(name),
            usages: vec![KeyUsage::Encrypt],
            material: KeyMaterial::new(vec![0]),
        }
    }

    #[test]
    fn test_standardize_algorithm_name() {
        assert_eq!(standardize_algorithm_name("rsassa-pkcs1-v1_5"), "RSASSA-PKCS1-v1_5");
        assert_eq!(standardize_algorithm_name("RSASSA-PKCS1-V1_5"), "RSASSA-PKCS1-v1_5");
        assert_eq!(standardize_algorithm_name("sha-256"), "SHA-256");
        assert_eq!(standardize_algorithm_name("ecdsa"), "ECDSA");
    }

    #[test]
    fn test_engine_descriptor_lowercases_name_and_hash() {
        let original = Algorithm::new("RSASSA-PKCS1-v1_5").with_hash("SHA-256");
        let lowered = engine_descriptor(&original);
        assert_eq!(lowered.name, "rsassa-pkcs1-v1_5");
        assert_eq!(lowered.hash_name(), Some("sha-256"));
        assert_eq!(original.name, "RSASSA-PKCS1-v1_5");
    }

    #[test]
    fn test_normalize_generated_pair() {
        let generated = GeneratedKey::Pair(crate::model::CryptoKeyPair {
            public_key: key(KeyType::Public, "RSASSA-PKCS1-V1_5"),
            private_key: key(KeyType::Private, "RSASSA-PKCS1-V1_5"),
        });
        let pair = normalize_generated(generated).into_pair().unwrap();
        assert_eq!(pair.public_key.usages, vec![KeyUsage::Verify]);
        assert_eq!(pair.private_key.usages, vec![KeyUsage::Sign]);
        assert_eq!(pair.public_key.algorithm.name, "RSASSA-PKCS1-v1_5");
        assert_eq!(pair.private_key.algorithm.name, "RSASSA-PKCS1-v1_5");
    }

    #[test]
    fn test_normalize_generated_secret() {
        let secret = normalize_generated(GeneratedKey::Secret(key(KeyType::Secret, "hmac")))
            .into_secret()
            .unwrap();
        assert_eq!(secret.usages, vec![KeyUsage::Sign, KeyUsage::Verify]);
        assert_eq!(secret.algorithm.name, "HMAC");
    }

    #[test]
    fn test_imported_usages_follow_type() {
        let data = KeyData::Bytes(vec![1]);
        for (key_type, expected) in [
            (KeyType::Secret, vec![KeyUsage::Sign, KeyUsage::Verify]),
            (KeyType::Private, vec![KeyUsage::Sign]),
            (KeyType::Public, vec![KeyUsage::Verify]),
        ] {
            let normalized =
                normalize_imported(key(key_type, "hmac"), KeyFormat::Raw, &data).unwrap();
            assert_eq!(normalized.usages, expected);
        }
    }

    #[test]
    fn test_imported_rsa_jwk_parameters() {
        let mut jwk = JsonWebKey::new("RSA");
        jwk.n = Some(B64U.encode([0xc5u8; 256]));
        jwk.e = Some("AQAB".to_string());
        let normalized = normalize_imported(
            key(KeyType::Public, "RSASSA-PKCS1-V1_5"),
            KeyFormat::Jwk,
            &KeyData::Jwk(jwk),
        )
        .unwrap();
        assert_eq!(normalized.algorithm.modulus_length, Some(2048));
        assert_eq!(normalized.algorithm.public_exponent, Some(vec![1, 0, 1]));
        assert_eq!(normalized.algorithm.name, "RSASSA-PKCS1-v1_5");
    }

    #[test]
    fn test_imported_rsa_jwk_missing_modulus() {
        let mut jwk = JsonWebKey::new("RSA");
        jwk.e = Some("AQAB".to_string());
        let result = normalize_imported(
            key(KeyType::Public, "RSA-PSS"),
            KeyFormat::Jwk,
            &KeyData::Jwk(jwk),
        );
        assert!(matches!(
            result,
            Err(crate::error::ShimError::Format(FormatError::MissingMember { member: "n" }))
        ));
    }

    #[test]
    fn test_modulus_bits_overflow() {
        assert_eq!(modulus_bits(256), Ok(2048));
        assert_eq!(modulus_bits(u32::MAX as usize / 8), Ok(u32::MAX / 8 * 8));
        assert_eq!(
            modulus_bits(u32::MAX as usize),
            Err(FormatError::ModulusTooLarge {
                bytes: u32::MAX as usize
            })
        );
    }

    #[test]
    fn test_exported_rsa_key_with_empty_private_member() {
        let mut jwk = JsonWebKey::new("RSA");
        jwk.d = Some(String::new());
        let exported = normalize_exported(KeyData::Jwk(jwk));
        assert_eq!(
            exported.as_jwk().unwrap().key_ops,
            Some(vec!["verify".to_string()])
        );
    }

    #[test]
    fn test_exported_ec_private_key() {
        let mut jwk = JsonWebKey::new("EC");
        jwk.alg = Some("EC-256".to_string());
        jwk.d = Some("AA".to_string());
        let exported = normalize_exported(KeyData::Jwk(jwk));
        let jwk = exported.as_jwk().unwrap();
        assert_eq!(jwk.alg, None);
        assert_eq!(jwk.key_ops, Some(vec!["sign".to_string()]));
    }

    #[test]
    fn test_exported_rsa_public_key_keeps_alg() {
        let mut jwk = JsonWebKey::new("RSA");
        jwk.alg = Some("RS256".to_string());
        jwk.key_ops = Some(vec!["sign".to_string(), "verify".to_string()]);
        let exported = normalize_exported(KeyData::Jwk(jwk));
        let jwk = exported.as_jwk().unwrap();
        assert_eq!(jwk.alg.as_deref(), Some("RS256"));
        assert_eq!(jwk.key_ops, Some(vec!["verify".to_string()]));
    }

    #[test]
    fn test_exported_oct_key_untouched() {
        let mut jwk = JsonWebKey::new("oct");
        jwk.key_ops = Some(vec!["encrypt".to_string()]);
        let exported = normalize_exported(KeyData::Jwk(jwk.clone()));
        assert_eq!(exported, KeyData::Jwk(jwk));
    }
}
