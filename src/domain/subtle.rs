//! Gated subtle surface
//!
//! Every operation waits for secure readiness before the engine is touched.
//! Argument and result normalisation happens around the engine call, never
//! before the gate.

use std::sync::Arc;

use tracing::debug;

use crate::domain::operation::Operation;
use crate::domain::readiness::Readiness;
use crate::error::{ShimError, ShimResult};
use crate::logic::normalize::{
    engine_descriptor, normalize_exported, normalize_generated, normalize_imported,
};
use crate::model::{Algorithm, BufferSource, CryptoKey, GeneratedKey, KeyData, KeyFormat, KeyUsage};
use crate::ports::CryptoEngine;

pub struct SubtleCrypto<E: CryptoEngine + ?Sized> {
    engine: Arc<E>,
    readiness: Arc<Readiness>,
}

impl<E: CryptoEngine + ?Sized> Clone for SubtleCrypto<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            readiness: Arc::clone(&self.readiness),
        }
    }
}

impl<E: CryptoEngine + ?Sized> SubtleCrypto<E> {
    pub fn new(engine: Arc<E>, readiness: Arc<Readiness>) -> Self {
        Self { engine, readiness }
    }

    async fn gate<T>(&self, operation: Operation, call: impl FnOnce(&E) -> ShimResult<T>) -> ShimResult<T> {
        if let Err(err) = self.readiness.ensure_secure().await {
            debug!(%operation, %err, "rejected: secure random seeding failed");
            return Err(ShimError::Entropy(err));
        }
        debug!(%operation, "dispatching to engine");
        call(&*self.engine)
    }

    pub async fn digest(
        &self,
        algorithm: &Algorithm,
        data: impl Into<BufferSource>,
    ) -> ShimResult<Vec<u8>> {
        let data = data.into();
        self.gate(Operation::Digest, |engine| {
            Ok(engine.digest(algorithm, &data.into_bytes())?)
        })
        .await
    }

    pub async fn sign(
        &self,
        algorithm: &Algorithm,
        key: &CryptoKey,
        data: impl Into<BufferSource>,
    ) -> ShimResult<Vec<u8>> {
        let data = data.into();
        self.gate(Operation::Sign, |engine| {
            Ok(engine.sign(algorithm, key, &data.into_bytes())?)
        })
        .await
    }

    pub async fn verify(
        &self,
        algorithm: &Algorithm,
        key: &CryptoKey,
        signature: &[u8],
        data: &[u8],
    ) -> ShimResult<bool> {
        self.gate(Operation::Verify, |engine| {
            Ok(engine.verify(algorithm, key, signature, data)?)
        })
        .await
    }

    pub async fn encrypt(
        &self,
        algorithm: &Algorithm,
        key: &CryptoKey,
        data: &[u8],
    ) -> ShimResult<Vec<u8>> {
        self.gate(Operation::Encrypt, |engine| {
            Ok(engine.encrypt(algorithm, key, data)?)
        })
        .await
    }

    pub async fn decrypt(
        &self,
        algorithm: &Algorithm,
        key: &CryptoKey,
        data: &[u8],
    ) -> ShimResult<Vec<u8>> {
        self.gate(Operation::Decrypt, |engine| {
            Ok(engine.decrypt(algorithm, key, data)?)
        })
        .await
    }

    /// Generate a key or key pair
    ///
    /// The engine receives a lower-cased copy of `algorithm`; the caller's
    /// descriptor is left as passed. Returned keys have standard usages and
    /// canonical algorithm names.
    pub async fn generate_key(
        &self,
        algorithm: &Algorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> ShimResult<GeneratedKey> {
        self.gate(Operation::GenerateKey, |engine| {
            let lowered = engine_descriptor(algorithm);
            debug!(algorithm = %lowered.name, "lower-cased descriptor for engine");
            let generated = engine.generate_key(&lowered, extractable, usages)?;
            Ok(normalize_generated(generated))
        })
        .await
    }

    pub async fn import_key(
        &self,
        format: KeyFormat,
        key_data: &KeyData,
        algorithm: &Algorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> ShimResult<CryptoKey> {
        self.gate(Operation::ImportKey, |engine| {
            let key = engine.import_key(format, key_data, algorithm, extractable, usages)?;
            normalize_imported(key, format, key_data)
        })
        .await
    }

    pub async fn export_key(&self, format: KeyFormat, key: &CryptoKey) -> ShimResult<KeyData> {
        self.gate(Operation::ExportKey, |engine| {
            Ok(normalize_exported(engine.export_key(format, key)?))
        })
        .await
    }

    pub async fn wrap_key(
        &self,
        format: KeyFormat,
        key: &CryptoKey,
        wrapping_key: &CryptoKey,
        wrap_algorithm: &Algorithm,
    ) -> ShimResult<Vec<u8>> {
        self.gate(Operation::WrapKey, |engine| {
            Ok(engine.wrap_key(format, key, wrapping_key, wrap_algorithm)?)
        })
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn unwrap_key(
        &self,
        format: KeyFormat,
        wrapped_key: &[u8],
        unwrapping_key: &CryptoKey,
        unwrap_algorithm: &Algorithm,
        unwrapped_key_algorithm: &Algorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> ShimResult<CryptoKey> {
        self.gate(Operation::UnwrapKey, |engine| {
            Ok(engine.unwrap_key(
                format,
                wrapped_key,
                unwrapping_key,
                unwrap_algorithm,
                unwrapped_key_algorithm,
                extractable,
                usages,
            )?)
        })
        .await
    }

    pub async fn derive_key(
        &self,
        algorithm: &Algorithm,
        base_key: &CryptoKey,
        derived_key_algorithm: &Algorithm,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> ShimResult<CryptoKey> {
        self.gate(Operation::DeriveKey, |engine| {
            Ok(engine.derive_key(algorithm, base_key, derived_key_algorithm, extractable, usages)?)
        })
        .await
    }
}
