//! Pure-Rust reference engine
//!
//! Covers SHA-2 digests, HMAC, AES-GCM (including key wrapping), Ed25519 and
//! HKDF. Like the engines the shim was written for, it reports key algorithm
//! names in its internal lower-case form and copies requested usages onto
//! every key it creates, leaving normalisation to the shim. It does not
//! enforce key usages.

use std::fmt;
use std::sync::Mutex;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::model::{
    Algorithm, CryptoKey, GeneratedKey, KeyData, KeyFormat, KeyType, KeyUsage,
};
use crate::ports::CryptoEngine;

mod aead;
mod eddsa;
mod hash;
mod kdf;
mod mac;

pub(crate) use hash::HashKind;

/// Algorithm families implemented here
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Hmac,
    AesGcm,
    Ed25519,
    Hkdf,
}

impl Family {
    fn of(name: &str, operation: &'static str) -> EngineResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "hmac" => Ok(Family::Hmac),
            "aes-gcm" => Ok(Family::AesGcm),
            "ed25519" => Ok(Family::Ed25519),
            "hkdf" => Ok(Family::Hkdf),
            _ => Err(EngineError::NotSupported {
                operation,
                algorithm: name.to_string(),
            }),
        }
    }

    /// Name stored on keys created by this engine
    fn internal_name(self) -> &'static str {
        match self {
            Family::Hmac => "hmac",
            Family::AesGcm => "aes-gcm",
            Family::Ed25519 => "ed25519",
            Family::Hkdf => "hkdf",
        }
    }

    fn unsupported(self, operation: &'static str) -> EngineError {
        EngineError::NotSupported {
            operation,
            algorithm: self.internal_name().to_string(),
        }
    }
}

/// Software engine holding an explicitly seeded PRNG
///
/// Randomness-dependent operations fail with [`EngineError::Unseeded`] until
/// [`CryptoEngine::init_prng`] has been called.
pub struct SoftwareEngine {
    rng: Mutex<Option<StdRng>>,
}

impl SoftwareEngine {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(None),
        }
    }

    pub fn is_seeded(&self) -> bool {
        self.rng.lock().map(|rng| rng.is_some()).unwrap_or(false)
    }

    fn fill(&self, buffer: &mut [u8]) -> EngineResult<()> {
        let mut guard = self.rng.lock().map_err(|_| EngineError::OperationFailed {
            reason: "PRNG lock poisoned".to_string(),
        })?;
        let rng = guard.as_mut().ok_or(EngineError::Unseeded)?;
        rng.fill_bytes(buffer);
        Ok(())
    }

    pub(crate) fn random_bytes(&self, length: usize) -> EngineResult<Vec<u8>> {
        let mut bytes = vec![0u8; length];
        self.fill(&mut bytes)?;
        Ok(bytes)
    }
}

impl Default for SoftwareEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SoftwareEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftwareEngine")
            .field("seeded", &self.is_seeded())
            .finish()
    }
}

pub(crate) fn b64u_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub(crate) fn b64u_member(member: &'static str, value: Option<&String>) -> EngineResult<Vec<u8>> {
    let value = value.ok_or_else(|| EngineError::DataError {
        format: KeyFormat::Jwk.to_string(),
        reason: format!("missing member `{member}`"),
    })?;
    Ok(URL_SAFE_NO_PAD.decode(value)?)
}

pub(crate) fn key_ops(usages: &[KeyUsage]) -> Vec<String> {
    usages.iter().map(|u| u.as_str().to_string()).collect()
}

fn serialize_key_data(data: KeyData) -> EngineResult<Vec<u8>> {
    match data {
        KeyData::Bytes(bytes) => Ok(bytes),
        KeyData::Jwk(jwk) => serde_json::to_vec(&jwk).map_err(|e| EngineError::OperationFailed {
            reason: format!("JWK serialization failed: {e}"),
        }),
    }
}

fn parse_key_data(format: KeyFormat, bytes: Vec<u8>) -> EngineResult<KeyData> {
    match format {
        KeyFormat::Jwk => serde_json::from_slice(&bytes)
            .map(KeyData::Jwk)
            .map_err(|e| EngineError::DataError {
                format: format.to_string(),
                reason: e.to_string(),
            }),
        _ => Ok(KeyData::Bytes(bytes)),
    }
}

/// Output length in bits for a key derived as `derived`
fn derived_length(derived: &Algorithm) -> EngineResult<u32> {
    match Family::of(&derived.name, "deriveKey")? {
        Family::Hmac => match derived.length {
            Some(bits) => Ok(bits),
            None => Ok(HashKind::require(derived.hash_name(), "deriveKey")?.block_bits()),
        },
        Family::AesGcm => derived.length.ok_or_else(|| EngineError::InvalidParameters {
            reason: "AES-GCM derived key requires a length".to_string(),
        }),
        other => Err(other.unsupported("deriveKey")),
    }
}

impl CryptoEngine for SoftwareEngine {
    fn init_prng(&self, seed: &[u8]) -> EngineResult<()> {
        if seed.is_empty() {
            return Err(EngineError::InvalidParameters {
                reason: "seed must not be empty".to_string(),
            });
        }
        let mut seed32 = [0u8; 32];
        seed32.copy_from_slice(&Sha256::digest(seed));

        let mut guard = self.rng.lock().map_err(|_| EngineError::OperationFailed {
            reason: "PRNG lock poisoned".to_string(),
        })?;
        *guard = Some(StdRng::from_seed(seed32));
        debug!(seed_len = seed.len(), "software engine PRNG seeded");
        Ok(())
    }

    fn get_random_values(&self, buffer: &mut [u8]) -> EngineResult<()> {
        self.fill(buffer)
    }

    fn digest(&self, algorithm: &Algorithm, data: &[u8]) -> EngineResult<Vec<u8>> {
        let hash = HashKind::parse(&algorithm.name).ok_or_else(|| EngineError::NotSupported {
            operation: "digest",
            algorithm: algorithm.name.clone(),
        })?;
        Ok(hash.digest(data))
    }

    fn sign(&self, _algorithm: &Algorithm, key: &CryptoKey, data: &[u8]) -> EngineResult<Vec<u8>> {
        match Family::of(&key.algorithm.name, "sign")? {
            Family::Hmac => mac::sign(key, data),
            Family::Ed25519 => eddsa::sign(key, data),
            other => Err(other.unsupported("sign")),
        }
    }

    fn verify(
        &self,
        _algorithm: &Algorithm,
        key: &CryptoKey,
        signature: &[u8],
        data: &[u8],
    ) -> EngineResult<bool> {
        match Family::of(&key.algorithm.name, "verify")? {
            Family::Hmac => mac::verify(key, signature, data),
            Family::Ed25519 => eddsa::verify(key, signature, data),
            other => Err(other.unsupported("verify")),
        }
    }

    fn encrypt(&self, algorithm: &Algorithm, key: &CryptoKey, data: &[u8]) -> EngineResult<Vec<u8>> {
        match Family::of(&algorithm.name, "encrypt")? {
            Family::AesGcm => aead::encrypt(algorithm, key, data),
            other => Err(other.unsupported("encrypt")),
        }
    }

    fn decrypt(&self, algorithm: &Algorithm, key: &CryptoKey, data: &[u8]) -> EngineResult<Vec<u8>> {
        match Family::of(&algorithm.name, "decrypt")? {
            Family::AesGcm => aead::decrypt(algorithm, key, data),
            other => Err(other.unsupported("decrypt")),
        }
    }

    fn generate_key(
        &self,
        algorithm: &Algorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> EngineResult<GeneratedKey> {
        match Family::of(&algorithm.name, "generateKey")? {
            Family::Hmac => mac::generate(self, algorithm, extractable, usages),
            Family::AesGcm => aead::generate(self, algorithm, extractable, usages),
            Family::Ed25519 => eddsa::generate(self, extractable, usages),
            other => Err(other.unsupported("generateKey")),
        }
    }

    fn import_key(
        &self,
        format: KeyFormat,
        key_data: &KeyData,
        algorithm: &Algorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> EngineResult<CryptoKey> {
        match Family::of(&algorithm.name, "importKey")? {
            Family::Hmac => mac::import(format, key_data, algorithm, extractable, usages),
            Family::AesGcm => aead::import(format, key_data, extractable, usages),
            Family::Ed25519 => eddsa::import(format, key_data, extractable, usages),
            Family::Hkdf => kdf::import(format, key_data, extractable, usages),
        }
    }

    fn export_key(&self, format: KeyFormat, key: &CryptoKey) -> EngineResult<KeyData> {
        if !key.extractable {
            return Err(EngineError::NotExtractable);
        }
        match Family::of(&key.algorithm.name, "exportKey")? {
            Family::Hmac => mac::export(format, key),
            Family::AesGcm => aead::export(format, key),
            Family::Ed25519 => eddsa::export(format, key),
            other => Err(other.unsupported("exportKey")),
        }
    }

    fn wrap_key(
        &self,
        format: KeyFormat,
        key: &CryptoKey,
        wrapping_key: &CryptoKey,
        wrap_algorithm: &Algorithm,
    ) -> EngineResult<Vec<u8>> {
        match Family::of(&wrap_algorithm.name, "wrapKey")? {
            Family::AesGcm => {
                let plain = serialize_key_data(self.export_key(format, key)?)?;
                aead::encrypt(wrap_algorithm, wrapping_key, &plain)
            }
            other => Err(other.unsupported("wrapKey")),
        }
    }

    fn unwrap_key(
        &self,
        format: KeyFormat,
        wrapped_key: &[u8],
        unwrapping_key: &CryptoKey,
        unwrap_algorithm: &Algorithm,
        unwrapped_key_algorithm: &Algorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> EngineResult<CryptoKey> {
        match Family::of(&unwrap_algorithm.name, "unwrapKey")? {
            Family::AesGcm => {
                let plain = aead::decrypt(unwrap_algorithm, unwrapping_key, wrapped_key)?;
                let key_data = parse_key_data(format, plain)?;
                self.import_key(format, &key_data, unwrapped_key_algorithm, extractable, usages)
            }
            other => Err(other.unsupported("unwrapKey")),
        }
    }

    fn derive_key(
        &self,
        algorithm: &Algorithm,
        base_key: &CryptoKey,
        derived_key_algorithm: &Algorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> EngineResult<CryptoKey> {
        match Family::of(&algorithm.name, "deriveKey")? {
            Family::Hkdf => {
                if base_key.key_type != KeyType::Secret
                    || Family::of(&base_key.algorithm.name, "deriveKey")? != Family::Hkdf
                {
                    return Err(EngineError::InvalidKey {
                        reason: "HKDF requires an HKDF base key".to_string(),
                    });
                }
                let bits = derived_length(derived_key_algorithm)?;
                let okm = kdf::derive_bits(algorithm, base_key, bits)?;
                self.import_key(
                    KeyFormat::Raw,
                    &KeyData::Bytes(okm),
                    derived_key_algorithm,
                    extractable,
                    usages,
                )
            }
            other => Err(other.unsupported("deriveKey")),
        }
    }
}
