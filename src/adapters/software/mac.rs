use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

use super::{b64u_encode, b64u_member, key_ops, Family, HashKind, SoftwareEngine};
use crate::error::{EngineError, EngineResult};
use crate::model::{
    Algorithm, CryptoKey, GeneratedKey, HashAlgorithm, JsonWebKey, KeyAlgorithm, KeyData,
    KeyFormat, KeyMaterial, KeyType, KeyUsage,
};

fn keyed<M: Mac + KeyInit>(key: &[u8], data: &[u8]) -> EngineResult<M> {
    let mut mac = <M as Mac>::new_from_slice(key).map_err(|e| EngineError::InvalidKey {
        reason: format!("HMAC key: {e}"),
    })?;
    mac.update(data);
    Ok(mac)
}

fn key_hash(key: &CryptoKey, operation: &'static str) -> EngineResult<HashKind> {
    HashKind::require(key.algorithm.hash.as_ref().map(|h| h.name.as_str()), operation)
}

pub(super) fn sign(key: &CryptoKey, data: &[u8]) -> EngineResult<Vec<u8>> {
    let secret = key.material.as_bytes();
    let tag = match key_hash(key, "sign")? {
        HashKind::Sha256 => keyed::<Hmac<Sha256>>(secret, data)?.finalize().into_bytes().to_vec(),
        HashKind::Sha384 => keyed::<Hmac<Sha384>>(secret, data)?.finalize().into_bytes().to_vec(),
        HashKind::Sha512 => keyed::<Hmac<Sha512>>(secret, data)?.finalize().into_bytes().to_vec(),
    };
    Ok(tag)
}

pub(super) fn verify(key: &CryptoKey, signature: &[u8], data: &[u8]) -> EngineResult<bool> {
    let secret = key.material.as_bytes();
    let valid = match key_hash(key, "verify")? {
        HashKind::Sha256 => keyed::<Hmac<Sha256>>(secret, data)?.verify_slice(signature).is_ok(),
        HashKind::Sha384 => keyed::<Hmac<Sha384>>(secret, data)?.verify_slice(signature).is_ok(),
        HashKind::Sha512 => keyed::<Hmac<Sha512>>(secret, data)?.verify_slice(signature).is_ok(),
    };
    Ok(valid)
}

fn hmac_key(hash: HashKind, bytes: Vec<u8>, extractable: bool, usages: &[KeyUsage]) -> CryptoKey {
    let mut algorithm = KeyAlgorithm::new(Family::Hmac.internal_name());
    algorithm.hash = Some(HashAlgorithm::new(hash.name()));
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
    let hash = HashKind::require(algorithm.hash_name(), "generateKey")?;
    let bits = algorithm.length.unwrap_or_else(|| hash.block_bits());
    if bits == 0 || bits % 8 != 0 {
        return Err(EngineError::InvalidParameters {
            reason: format!("HMAC key length must be a positive multiple of 8, got {bits}"),
        });
    }
    let bytes = engine.random_bytes((bits / 8) as usize)?;
    Ok(GeneratedKey::Secret(hmac_key(hash, bytes, extractable, usages)))
}

pub(super) fn import(
    format: KeyFormat,
    key_data: &KeyData,
    algorithm: &Algorithm,
    extractable: bool,
    usages: &[KeyUsage],
) -> EngineResult<CryptoKey> {
    let hash = HashKind::require(algorithm.hash_name(), "importKey")?;
    let bytes = match (format, key_data) {
        (KeyFormat::Raw, KeyData::Bytes(bytes)) => bytes.clone(),
        (KeyFormat::Jwk, KeyData::Jwk(jwk)) if jwk.kty == "oct" => b64u_member("k", jwk.k.as_ref())?,
        _ => {
            return Err(EngineError::DataError {
                format: format.to_string(),
                reason: "HMAC keys import from raw bytes or an oct JWK".to_string(),
            })
        }
    };
    if bytes.is_empty() {
        return Err(EngineError::DataError {
            format: format.to_string(),
            reason: "empty HMAC key".to_string(),
        });
    }
    Ok(hmac_key(hash, bytes, extractable, usages))
}

pub(super) fn export(format: KeyFormat, key: &CryptoKey) -> EngineResult<KeyData> {
    match format {
        KeyFormat::Raw => Ok(KeyData::Bytes(key.material.as_bytes().to_vec())),
        KeyFormat::Jwk => {
            let hash = key_hash(key, "exportKey")?;
            let mut jwk = JsonWebKey::new("oct");
            jwk.k = Some(b64u_encode(key.material.as_bytes()));
            jwk.alg = Some(format!("HS{}", hash.bits()));
            jwk.key_ops = Some(key_ops(&key.usages));
            jwk.ext = Some(key.extractable);
            Ok(KeyData::Jwk(jwk))
        }
        other => Err(EngineError::NotSupported {
            operation: "exportKey",
            algorithm: format!("hmac/{other}"),
        }),
    }
}
