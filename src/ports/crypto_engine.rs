//! CryptoEngine trait - the primitive provider the shim wraps

use crate::error::EngineResult;
use crate::model::{Algorithm, CryptoKey, GeneratedKey, KeyData, KeyFormat, KeyUsage};

/// Synchronous cryptographic primitive set
///
/// Implementations complete each call before returning. The shim never
/// interprets their errors; whatever an engine reports reaches the caller
/// unchanged.
///
/// Engines whose PRNG needs external entropy report `requires_seeding() ==
/// true` and accept seed bytes exactly once through [`CryptoEngine::init_prng`].
pub trait CryptoEngine: Send + Sync {
    /// Whether the engine must be seeded before randomness-dependent use
    fn requires_seeding(&self) -> bool {
        true
    }

    /// Seed the engine PRNG
    fn init_prng(&self, seed: &[u8]) -> EngineResult<()>;

    /// Fill `buffer` with random bytes from the engine PRNG
    fn get_random_values(&self, buffer: &mut [u8]) -> EngineResult<()>;

    fn digest(&self, algorithm: &Algorithm, data: &[u8]) -> EngineResult<Vec<u8>>;

    fn sign(&self, algorithm: &Algorithm, key: &CryptoKey, data: &[u8]) -> EngineResult<Vec<u8>>;

    fn verify(
        &self,
        algorithm: &Algorithm,
        key: &CryptoKey,
        signature: &[u8],
        data: &[u8],
    ) -> EngineResult<bool>;

    fn encrypt(&self, algorithm: &Algorithm, key: &CryptoKey, data: &[u8])
        -> EngineResult<Vec<u8>>;

    fn decrypt(&self, algorithm: &Algorithm, key: &CryptoKey, data: &[u8])
        -> EngineResult<Vec<u8>>;

    fn generate_key(
        &self,
        algorithm: &Algorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> EngineResult<GeneratedKey>;

    fn import_key(
        &self,
        format: KeyFormat,
        key_data: &KeyData,
        algorithm: &Algorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> EngineResult<CryptoKey>;

    fn export_key(&self, format: KeyFormat, key: &CryptoKey) -> EngineResult<KeyData>;

    fn wrap_key(
        &self,
        format: KeyFormat,
        key: &CryptoKey,
        wrapping_key: &CryptoKey,
        wrap_algorithm: &Algorithm,
    ) -> EngineResult<Vec<u8>>;

    #[allow(clippy::too_many_arguments)]
    fn unwrap_key(
        &self,
        format: KeyFormat,
        wrapped_key: &[u8],
        unwrapping_key: &CryptoKey,
        unwrap_algorithm: &Algorithm,
        unwrapped_key_algorithm: &Algorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> EngineResult<CryptoKey>;

    fn derive_key(
        &self,
        algorithm: &Algorithm,
        base_key: &CryptoKey,
        derived_key_algorithm: &Algorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> EngineResult<CryptoKey>;
}
