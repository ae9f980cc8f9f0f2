//! Public entry points
//!
//! [`Crypto`] is the object hosts hand to callers. It is usable immediately
//! after construction: the subtle surface queues behind readiness, and only
//! the raw random accessor refuses to run early.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use crate::config::ShimConfig;
use crate::domain::{Readiness, ReadinessEvent, ReadinessState, SubtleCrypto};
use crate::error::{ShimError, ShimResult};
use crate::logic::entropy_selection::select_entropy_source;
use crate::ports::{CryptoEngine, EntropySource};

pub use crate::logic::normalize::standardize_algorithm_name;

pub struct Crypto<E: CryptoEngine + ?Sized> {
    engine: Arc<E>,
    readiness: Arc<Readiness>,
    subtle: SubtleCrypto<E>,
}

impl<E: CryptoEngine + ?Sized + 'static> Crypto<E> {
    /// Facade over `engine` that waits for [`Crypto::initialize`] to be driven
    pub fn new(engine: Arc<E>, config: &ShimConfig) -> Self {
        let readiness = Arc::new(Readiness::new(engine.requires_seeding(), config.seed_length));
        let subtle = SubtleCrypto::new(Arc::clone(&engine), Arc::clone(&readiness));
        Self {
            engine,
            readiness,
            subtle,
        }
    }

    /// Facade whose seeding from `source` runs as a background task
    ///
    /// Must be called from within a tokio runtime.
    pub fn launch(engine: Arc<E>, source: Arc<dyn EntropySource>, config: &ShimConfig) -> Self {
        let crypto = Self::new(engine, config);
        let engine = Arc::clone(&crypto.engine);
        let readiness = Arc::clone(&crypto.readiness);
        tokio::spawn(async move {
            readiness.initialize(&*engine, &*source).await;
        });
        crypto
    }

    /// Like [`Crypto::launch`], with the random source picked for this host
    ///
    /// A selection failure becomes the permanent readiness error.
    pub fn launch_on_host(engine: Arc<E>, config: &ShimConfig) -> Self {
        if !engine.requires_seeding() {
            debug!("engine is self-seeded; skipping random source selection");
            return Self::new(engine, config);
        }
        match select_entropy_source(config) {
            Ok(source) => Self::launch(engine, source, config),
            Err(err) => {
                let crypto = Self::new(engine, config);
                crypto.readiness.fail(err);
                crypto
            }
        }
    }

    /// Seed the engine from `source`; a no-op once readiness has settled
    pub async fn initialize(&self, source: &dyn EntropySource) {
        self.readiness.initialize(&*self.engine, source).await;
    }

    pub async fn ensure_secure(&self) -> ShimResult<()> {
        Ok(self.readiness.ensure_secure().await?)
    }

    /// Fill `buffer` from the engine PRNG
    ///
    /// Fails with [`ShimError::NotYetSecure`] until seeding has completed;
    /// await [`Crypto::ensure_secure`] first.
    pub fn get_random_values<'a>(&self, buffer: &'a mut [u8]) -> ShimResult<&'a mut [u8]> {
        if !self.readiness.is_secured() {
            return Err(ShimError::NotYetSecure);
        }
        self.engine.get_random_values(buffer)?;
        Ok(buffer)
    }

    pub fn subtle(&self) -> &SubtleCrypto<E> {
        &self.subtle
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReadinessEvent> {
        self.readiness.subscribe()
    }

    pub fn readiness_state(&self) -> ReadinessState {
        self.readiness.state()
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }
}
