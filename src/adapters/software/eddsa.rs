use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};

use super::{b64u_encode, b64u_member, key_ops, Family, SoftwareEngine};
use crate::error::{EngineError, EngineResult};
use crate::model::{
    CryptoKey, CryptoKeyPair, GeneratedKey, JsonWebKey, KeyAlgorithm, KeyData, KeyFormat,
    KeyMaterial, KeyType, KeyUsage,
};

const CURVE: &str = "Ed25519";

fn array32(bytes: &[u8], what: &str) -> EngineResult<[u8; 32]> {
    bytes.try_into().map_err(|_| EngineError::InvalidKey {
        reason: format!("Ed25519 {what} must be 32 bytes, got {}", bytes.len()),
    })
}

fn ed_key(key_type: KeyType, bytes: Vec<u8>, extractable: bool, usages: &[KeyUsage]) -> CryptoKey {
    CryptoKey {
        key_type,
        extractable,
        algorithm: KeyAlgorithm::new(Family::Ed25519.internal_name()),
        usages: usages.to_vec(),
        material: KeyMaterial::new(bytes),
    }
}

fn signing_key(key: &CryptoKey) -> EngineResult<SigningKey> {
    if key.key_type != KeyType::Private {
        return Err(EngineError::InvalidKey {
            reason: format!("Ed25519 signing needs a private key, got {}", key.key_type),
        });
    }
    Ok(SigningKey::from_bytes(&array32(key.material.as_bytes(), "private key")?))
}

pub(super) fn sign(key: &CryptoKey, data: &[u8]) -> EngineResult<Vec<u8>> {
    Ok(signing_key(key)?.sign(data).to_bytes().to_vec())
}

pub(super) fn verify(key: &CryptoKey, signature: &[u8], data: &[u8]) -> EngineResult<bool> {
    if key.key_type != KeyType::Public {
        return Err(EngineError::InvalidKey {
            reason: format!("Ed25519 verification needs a public key, got {}", key.key_type),
        });
    }
    let verifying_key = VerifyingKey::from_bytes(&array32(key.material.as_bytes(), "public key")?)?;
    let Ok(signature) = <[u8; Signature::BYTE_SIZE]>::try_from(signature) else {
        return Ok(false);
    };
    Ok(verifying_key
        .verify_strict(data, &Signature::from_bytes(&signature))
        .is_ok())
}

pub(super) fn generate(
    engine: &SoftwareEngine,
    extractable: bool,
    usages: &[KeyUsage],
) -> EngineResult<GeneratedKey> {
    let seed = array32(&engine.random_bytes(32)?, "seed")?;
    let signing_key = SigningKey::from_bytes(&seed);
    let public = signing_key.verifying_key().to_bytes().to_vec();

    Ok(GeneratedKey::Pair(CryptoKeyPair {
        public_key: ed_key(KeyType::Public, public, true, usages),
        private_key: ed_key(KeyType::Private, seed.to_vec(), extractable, usages),
    }))
}

pub(super) fn import(
    format: KeyFormat,
    key_data: &KeyData,
    extractable: bool,
    usages: &[KeyUsage],
) -> EngineResult<CryptoKey> {
    match (format, key_data) {
        (KeyFormat::Raw, KeyData::Bytes(bytes)) => {
            VerifyingKey::from_bytes(&array32(bytes, "public key")?)?;
            Ok(ed_key(KeyType::Public, bytes.clone(), extractable, usages))
        }
        (KeyFormat::Jwk, KeyData::Jwk(jwk)) => {
            if jwk.kty != "OKP" || jwk.crv.as_deref() != Some(CURVE) {
                return Err(EngineError::DataError {
                    format: format.to_string(),
                    reason: "expected an OKP JWK on Ed25519".to_string(),
                });
            }
            let x = array32(&b64u_member("x", jwk.x.as_ref())?, "public key")?;
            match jwk.d.as_ref() {
                Some(_) => {
                    let d = array32(&b64u_member("d", jwk.d.as_ref())?, "private key")?;
                    if SigningKey::from_bytes(&d).verifying_key().to_bytes() != x {
                        return Err(EngineError::DataError {
                            format: format.to_string(),
                            reason: "`x` does not match `d`".to_string(),
                        });
                    }
                    Ok(ed_key(KeyType::Private, d.to_vec(), extractable, usages))
                }
                None => {
                    VerifyingKey::from_bytes(&x)?;
                    Ok(ed_key(KeyType::Public, x.to_vec(), extractable, usages))
                }
            }
        }
        _ => Err(EngineError::NotSupported {
            operation: "importKey",
            algorithm: format!("ed25519/{format}"),
        }),
    }
}

pub(super) fn export(format: KeyFormat, key: &CryptoKey) -> EngineResult<KeyData> {
    match (format, key.key_type) {
        (KeyFormat::Raw, KeyType::Public) => Ok(KeyData::Bytes(key.material.as_bytes().to_vec())),
        (KeyFormat::Jwk, KeyType::Public) => {
            let mut jwk = JsonWebKey::new("OKP");
            jwk.crv = Some(CURVE.to_string());
            jwk.x = Some(b64u_encode(key.material.as_bytes()));
            jwk.key_ops = Some(key_ops(&key.usages));
            jwk.ext = Some(key.extractable);
            Ok(KeyData::Jwk(jwk))
        }
        (KeyFormat::Jwk, KeyType::Private) => {
            let signing_key = signing_key(key)?;
            let mut jwk = JsonWebKey::new("OKP");
            jwk.crv = Some(CURVE.to_string());
            jwk.x = Some(b64u_encode(signing_key.verifying_key().as_bytes()));
            jwk.d = Some(b64u_encode(key.material.as_bytes()));
            jwk.key_ops = Some(key_ops(&key.usages));
            jwk.ext = Some(key.extractable);
            Ok(KeyData::Jwk(jwk))
        }
        _ => Err(EngineError::NotSupported {
            operation: "exportKey",
            algorithm: format!("ed25519/{format}"),
        }),
    }
}
