use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm, KeyInit, Nonce};

use super::{b64u_encode, b64u_member, key_ops, Family, SoftwareEngine};
use crate::error::{EngineError, EngineResult};
use crate::model::{
    Algorithm, CryptoKey, GeneratedKey, JsonWebKey, KeyAlgorithm, KeyData, KeyFormat,
    KeyMaterial, KeyType, KeyUsage,
};

/// Only 96-bit IVs are accepted
const IV_LENGTH: usize = 12;

const TAG_BITS: u32 = 128;

fn check_length(bits: u32) -> EngineResult<()> {
    match bits {
        128 | 256 => Ok(()),
        other => Err(EngineError::NotSupported {
            operation: "AES-GCM",
            algorithm: format!("AES-GCM-{other}"),
        }),
    }
}

fn params(algorithm: &Algorithm) -> EngineResult<(&[u8], &[u8])> {
    let iv = algorithm
        .iv
        .as_deref()
        .ok_or_else(|| EngineError::InvalidParameters {
            reason: "AES-GCM requires an iv".to_string(),
        })?;
    if iv.len() != IV_LENGTH {
        return Err(EngineError::InvalidParameters {
            reason: format!("AES-GCM iv must be {IV_LENGTH} bytes, got {}", iv.len()),
        });
    }
    if let Some(tag_length) = algorithm.tag_length {
        if tag_length != TAG_BITS {
            return Err(EngineError::InvalidParameters {
                reason: format!("unsupported AES-GCM tag length {tag_length}"),
            });
        }
    }
    Ok((iv, algorithm.additional_data.as_deref().unwrap_or(&[])))
}

fn wrong_key_size(len: usize) -> EngineError {
    EngineError::InvalidKey {
        reason: format!("AES-GCM key must be 16 or 32 bytes, got {len}"),
    }
}

pub(super) fn encrypt(algorithm: &Algorithm, key: &CryptoKey, data: &[u8]) -> EngineResult<Vec<u8>> {
    let (iv, aad) = params(algorithm)?;
    let secret = key.material.as_bytes();
    let nonce = Nonce::from_slice(iv);
    let payload = Payload { msg: data, aad };
    let sealed = match secret.len() {
        16 => Aes128Gcm::new_from_slice(secret)
            .map_err(|_| wrong_key_size(16))?
            .encrypt(nonce, payload),
        32 => Aes256Gcm::new_from_slice(secret)
            .map_err(|_| wrong_key_size(32))?
            .encrypt(nonce, payload),
        other => return Err(wrong_key_size(other)),
    };
    sealed.map_err(|_| EngineError::OperationFailed {
        reason: "AES-GCM encryption failed".to_string(),
    })
}

pub(super) fn decrypt(algorithm: &Algorithm, key: &CryptoKey, data: &[u8]) -> EngineResult<Vec<u8>> {
    let (iv, aad) = params(algorithm)?;
    let secret = key.material.as_bytes();
    let nonce = Nonce::from_slice(iv);
    let payload = Payload { msg: data, aad };
    let opened = match secret.len() {
        16 => Aes128Gcm::new_from_slice(secret)
            .map_err(|_| wrong_key_size(16))?
            .decrypt(nonce, payload),
        32 => Aes256Gcm::new_from_slice(secret)
            .map_err(|_| wrong_key_size(32))?
            .decrypt(nonce, payload),
        other => return Err(wrong_key_size(other)),
    };
    opened.map_err(|_| EngineError::OperationFailed {
        reason: "AES-GCM authentication failed".to_string(),
    })
}

fn aes_key(bytes: Vec<u8>, extractable: bool, usages: &[KeyUsage]) -> CryptoKey {
    let mut algorithm = KeyAlgorithm::new(Family::AesGcm.internal_name());
    algorithm.length = Some((bytes.len() * 8) as u32);
    CryptoKey {
        key_type: KeyType::Secret,
        extractable,
        algorithm,
        usages: usages.to_vec(),
        material: KeyMaterial::new(bytes),
    }
}

pub(super) fn generate(
    engine: &SoftwareEngine,
    algorithm: &Algorithm,
    extractable: bool,
    usages: &[KeyUsage],
) -> EngineResult<GeneratedKey> {
    let bits = algorithm.length.ok_or_else(|| EngineError::InvalidParameters {
        reason: "AES-GCM key generation requires a length".to_string(),
    })?;
    check_length(bits)?;
    let bytes = engine.random_bytes((bits / 8) as usize)?;
    Ok(GeneratedKey::Secret(aes_key(bytes, extractable, usages)))
}

pub(super) fn import(
    format: KeyFormat,
    key_data: &KeyData,
    extractable: bool,
    usages: &[KeyUsage],
) -> EngineResult<CryptoKey> {
    let bytes = match (format, key_data) {
        (KeyFormat::Raw, KeyData::Bytes(bytes)) => bytes.clone(),
        (KeyFormat::Jwk, KeyData::Jwk(jwk)) if jwk.kty == "oct" => b64u_member("k", jwk.k.as_ref())?,
        _ => {
            return Err(EngineError::DataError {
                format: format.to_string(),
                reason: "AES-GCM keys import from raw bytes or an oct JWK".to_string(),
            })
        }
    };
    check_length((bytes.len() * 8) as u32)?;
    Ok(aes_key(bytes, extractable, usages))
}

pub(super) fn export(format: KeyFormat, key: &CryptoKey) -> EngineResult<KeyData> {
    match format {
        KeyFormat::Raw => Ok(KeyData::Bytes(key.material.as_bytes().to_vec())),
        KeyFormat::Jwk => {
            let mut jwk = JsonWebKey::new("oct");
            jwk.k = Some(b64u_encode(key.material.as_bytes()));
            jwk.alg = Some(format!("A{}GCM", key.material.as_bytes().len() * 8));
            jwk.key_ops = Some(key_ops(&key.usages));
            jwk.ext = Some(key.extractable);
            Ok(KeyData::Jwk(jwk))
        }
        other => Err(EngineError::NotSupported {
            operation: "exportKey",
            algorithm: format!("aes-gcm/{other}"),
        }),
    }
}
