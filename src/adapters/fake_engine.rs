use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::adapters::software::HashKind;
use crate::error::{EngineError, EngineResult};
use crate::model::{
    Algorithm, CryptoKey, CryptoKeyPair, GeneratedKey, JsonWebKey, KeyAlgorithm, KeyData,
    KeyFormat, KeyMaterial, KeyType, KeyUsage,
};
use crate::ports::CryptoEngine;

/// Byte returned by the first `get_random_values` draw; each later draw adds one
pub const RANDOM_FILL: u8 = 0xab;

/// Scripted engine reproducing the metadata quirks the shim corrects
///
/// * key algorithm names come back upper-cased (`RSASSA-PKCS1-V1_5`)
/// * generated and imported keys carry whatever usages were requested
/// * JWK-imported RSA keys have no modulus length or exponent
/// * `generate_key` rejects descriptors whose names are not lower-case
/// * `export_key` returns [`FakeEngine::export_template`] verbatim
#[derive(Debug)]
pub struct FakeEngine {
    needs_seed: bool,
    seeded: AtomicBool,
    seed_calls: AtomicUsize,
    random_draws: AtomicUsize,
    pub calls: Mutex<Vec<&'static str>>,
    pub last_data: Mutex<Option<Vec<u8>>>,
    pub last_algorithm: Mutex<Option<Algorithm>>,
    pub export_template: Mutex<JsonWebKey>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            needs_seed: true,
            seeded: AtomicBool::new(false),
            seed_calls: AtomicUsize::new(0),
            random_draws: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
            last_data: Mutex::new(None),
            last_algorithm: Mutex::new(None),
            export_template: Mutex::new(JsonWebKey::new("oct")),
        }
    }

    /// Engine whose PRNG is self-seeded
    pub fn self_seeded() -> Self {
        Self {
            needs_seed: false,
            ..Self::new()
        }
    }

    pub fn with_export(self, jwk: JsonWebKey) -> Self {
        *self.export_template.lock().unwrap() = jwk;
        self
    }

    pub fn seed_calls(&self) -> usize {
        self.seed_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_data(&self) -> Option<Vec<u8>> {
        self.last_data.lock().unwrap().clone()
    }

    pub fn last_algorithm(&self) -> Option<Algorithm> {
        self.last_algorithm.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str) {
        self.calls.lock().unwrap().push(operation);
    }

    fn record_algorithm(&self, algorithm: &Algorithm) {
        *self.last_algorithm.lock().unwrap() = Some(algorithm.clone());
    }

    fn record_data(&self, data: &[u8]) {
        *self.last_data.lock().unwrap() = Some(data.to_vec());
    }

    fn key(
        key_type: KeyType,
        name: &str,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> CryptoKey {
        CryptoKey {
            key_type,
            extractable,
            algorithm: KeyAlgorithm::new(name.to_ascii_uppercase()),
            usages: usages.to_vec(),
            material: KeyMaterial::new(vec![1, 2, 3, 4]),
        }
    }
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn is_asymmetric(name: &str) -> bool {
    matches!(
        name,
        "rsassa-pkcs1-v1_5" | "rsa-pss" | "rsa-oaep" | "ecdsa" | "ecdh" | "ed25519"
    )
}

impl CryptoEngine for FakeEngine {
    fn requires_seeding(&self) -> bool {
        self.needs_seed
    }

    fn init_prng(&self, seed: &[u8]) -> EngineResult<()> {
        self.seed_calls.fetch_add(1, Ordering::SeqCst);
        self.record_data(seed);
        self.seeded.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn get_random_values(&self, buffer: &mut [u8]) -> EngineResult<()> {
        if self.needs_seed && !self.seeded.load(Ordering::SeqCst) {
            return Err(EngineError::Unseeded);
        }
        let draw = self.random_draws.fetch_add(1, Ordering::SeqCst);
        buffer.fill(RANDOM_FILL.wrapping_add(draw as u8));
        self.record("getRandomValues");
        Ok(())
    }

    fn digest(&self, algorithm: &Algorithm, data: &[u8]) -> EngineResult<Vec<u8>> {
        self.record("digest");
        self.record_data(data);
        let hash = HashKind::parse(&algorithm.name).ok_or_else(|| EngineError::NotSupported {
            operation: "digest",
            algorithm: algorithm.name.clone(),
        })?;
        Ok(hash.digest(data))
    }

    fn sign(&self, algorithm: &Algorithm, _key: &CryptoKey, data: &[u8]) -> EngineResult<Vec<u8>> {
        self.record("sign");
        self.record_algorithm(algorithm);
        self.record_data(data);
        Ok(HashKind::Sha256.digest(data))
    }

    fn verify(
        &self,
        _algorithm: &Algorithm,
        _key: &CryptoKey,
        signature: &[u8],
        data: &[u8],
    ) -> EngineResult<bool> {
        self.record("verify");
        Ok(HashKind::Sha256.digest(data) == signature)
    }

    fn encrypt(&self, _algorithm: &Algorithm, _key: &CryptoKey, data: &[u8]) -> EngineResult<Vec<u8>> {
        self.record("encrypt");
        Ok(data.iter().rev().copied().collect())
    }

    fn decrypt(&self, _algorithm: &Algorithm, _key: &CryptoKey, data: &[u8]) -> EngineResult<Vec<u8>> {
        self.record("decrypt");
        Ok(data.iter().rev().copied().collect())
    }

    fn generate_key(
        &self,
        algorithm: &Algorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> EngineResult<GeneratedKey> {
        self.record("generateKey");
        self.record_algorithm(algorithm);
        let hash_is_lower = algorithm
            .hash_name()
            .map_or(true, |h| h == h.to_ascii_lowercase());
        if algorithm.name != algorithm.name.to_ascii_lowercase() || !hash_is_lower {
            return Err(EngineError::InvalidParameters {
                reason: format!("unrecognized algorithm {}", algorithm.name),
            });
        }
        if is_asymmetric(&algorithm.name) {
            Ok(GeneratedKey::Pair(CryptoKeyPair {
                public_key: Self::key(KeyType::Public, &algorithm.name, true, usages),
                private_key: Self::key(KeyType::Private, &algorithm.name, extractable, usages),
            }))
        } else {
            Ok(GeneratedKey::Secret(Self::key(
                KeyType::Secret,
                &algorithm.name,
                extractable,
                usages,
            )))
        }
    }

    fn import_key(
        &self,
        _format: KeyFormat,
        key_data: &KeyData,
        algorithm: &Algorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> EngineResult<CryptoKey> {
        self.record("importKey");
        self.record_algorithm(algorithm);
        let key_type = match key_data {
            KeyData::Jwk(jwk) if jwk.kty == "oct" => KeyType::Secret,
            KeyData::Jwk(jwk) if jwk.d.is_some() => KeyType::Private,
            KeyData::Jwk(_) => KeyType::Public,
            KeyData::Bytes(_) => KeyType::Secret,
        };
        Ok(Self::key(key_type, &algorithm.name, extractable, usages))
    }

    fn export_key(&self, _format: KeyFormat, _key: &CryptoKey) -> EngineResult<KeyData> {
        self.record("exportKey");
        Ok(KeyData::Jwk(self.export_template.lock().unwrap().clone()))
    }

    fn wrap_key(
        &self,
        _format: KeyFormat,
        key: &CryptoKey,
        _wrapping_key: &CryptoKey,
        _wrap_algorithm: &Algorithm,
    ) -> EngineResult<Vec<u8>> {
        self.record("wrapKey");
        Ok(key.material.as_bytes().to_vec())
    }

    fn unwrap_key(
        &self,
        _format: KeyFormat,
        wrapped_key: &[u8],
        _unwrapping_key: &CryptoKey,
        _unwrap_algorithm: &Algorithm,
        unwrapped_key_algorithm: &Algorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> EngineResult<CryptoKey> {
        self.record("unwrapKey");
        let mut key = Self::key(KeyType::Secret, &unwrapped_key_algorithm.name, extractable, usages);
        key.material = KeyMaterial::new(wrapped_key.to_vec());
        Ok(key)
    }

    fn derive_key(
        &self,
        _algorithm: &Algorithm,
        _base_key: &CryptoKey,
        derived_key_algorithm: &Algorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> EngineResult<CryptoKey> {
        self.record("deriveKey");
        Ok(Self::key(KeyType::Secret, &derived_key_algorithm.name, extractable, usages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract_tests_for;
    use crate::ports::contract_tests::engine_contract;

    contract_tests_for!(
        fake_engine_contract,
        make = FakeEngine::new,
        tests = {
            test_random_values_after_seeding => engine_contract::test_random_values_after_seeding,
            test_random_values_before_seeding => engine_contract::test_random_values_before_seeding,
            test_digest_sha256 => engine_contract::test_digest_sha256,
            test_digest_unknown_algorithm => engine_contract::test_digest_unknown_algorithm,
            test_generate_hmac_sign_verify => engine_contract::test_generate_hmac_sign_verify,
        }
    );

    #[test]
    fn test_generate_rejects_mixed_case() {
        let engine = FakeEngine::new();
        let result = engine.generate_key(&Algorithm::new("HMAC"), true, &[]);
        assert!(result.is_err());
    }
}
