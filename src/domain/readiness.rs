//! Secure-readiness state machine
//!
//! Owns the single `Pending -> Secured | Failed` transition. The engine is
//! seeded exactly once; the outcome is broadcast to current subscribers and
//! replayed from the stored state to anyone who asks later.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};

use crate::error::EntropyError;
use crate::ports::{CryptoEngine, EntropySource};

const EVENT_CAPACITY: usize = 4;

/// Snapshot of the readiness state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessState {
    Pending,
    Secured,
    Failed(EntropyError),
}

impl ReadinessState {
    pub fn is_secured(&self) -> bool {
        matches!(self, ReadinessState::Secured)
    }

    pub fn error(&self) -> Option<&EntropyError> {
        match self {
            ReadinessState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Notification emitted when readiness settles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessEvent {
    Secure,
    SecureRandomError(EntropyError),
}

impl ReadinessEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ReadinessEvent::Secure => "secure",
            ReadinessEvent::SecureRandomError(_) => "secureRandomError",
        }
    }
}

#[derive(Debug)]
pub struct Readiness {
    state: RwLock<ReadinessState>,
    events: broadcast::Sender<ReadinessEvent>,
    started: AtomicBool,
    seed_length: usize,
}

impl Readiness {
    /// New state machine; already secured when the engine needs no seeding
    pub fn new(requires_seeding: bool, seed_length: usize) -> Self {
        let initial = if requires_seeding {
            ReadinessState::Pending
        } else {
            ReadinessState::Secured
        };
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: RwLock::new(initial),
            events,
            started: AtomicBool::new(false),
            seed_length,
        }
    }

    pub fn state(&self) -> ReadinessState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_secured(&self) -> bool {
        self.state().is_secured()
    }

    /// Receive future `secure` / `secureRandomError` events; earlier ones are not replayed
    pub fn subscribe(&self) -> broadcast::Receiver<ReadinessEvent> {
        self.events.subscribe()
    }

    /// Draw the seed and feed it to the engine
    ///
    /// Runs at most once. Later calls, and calls on an engine that needs no
    /// seeding, return without touching the source.
    pub async fn initialize<E>(&self, engine: &E, source: &dyn EntropySource)
    where
        E: CryptoEngine + ?Sized,
    {
        if self.state() != ReadinessState::Pending {
            debug!("readiness already settled; skipping seeding");
            return;
        }
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("readiness initialization already in flight; ignoring second call");
            return;
        }

        if !source.is_secure() {
            warn!(
                source = source.name(),
                "seeding engine from an INSECURE random source; outputs are predictable"
            );
        }

        let outcome = self.seed(engine, source).await;
        self.settle(outcome);
    }

    async fn seed<E>(&self, engine: &E, source: &dyn EntropySource) -> Result<(), EntropyError>
    where
        E: CryptoEngine + ?Sized,
    {
        let bytes = source.provide(self.seed_length).await?;
        if bytes.len() != self.seed_length {
            return Err(EntropyError::ShortRead {
                expected: self.seed_length,
                actual: bytes.len(),
            });
        }
        engine
            .init_prng(&bytes)
            .map_err(|e| EntropyError::SeedRejected {
                reason: e.to_string(),
            })?;
        info!(source = source.name(), "engine PRNG seeded");
        Ok(())
    }

    /// Record a failure that happened before any source could be asked
    pub fn fail(&self, err: EntropyError) {
        self.started.store(true, Ordering::SeqCst);
        self.settle(Err(err));
    }

    fn settle(&self, outcome: Result<(), EntropyError>) {
        let event = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if *state != ReadinessState::Pending {
                return;
            }
            match outcome {
                Ok(()) => {
                    *state = ReadinessState::Secured;
                    ReadinessEvent::Secure
                }
                Err(err) => {
                    error!(%err, "secure random seeding failed; randomness-dependent operations will be rejected");
                    *state = ReadinessState::Failed(err.clone());
                    ReadinessEvent::SecureRandomError(err)
                }
            }
        };
        debug!(event = event.name(), "readiness settled");
        // No receivers is fine; late callers read the stored state.
        let _ = self.events.send(event);
    }

    /// Resolve once seeding succeeded, or fail with the recorded error
    pub async fn ensure_secure(&self) -> Result<(), EntropyError> {
        // Subscribe before reading state so a settlement in between is not missed.
        let mut events = self.events.subscribe();
        loop {
            match self.state() {
                ReadinessState::Secured => return Ok(()),
                ReadinessState::Failed(err) => return Err(err),
                ReadinessState::Pending => {}
            }
            match events.recv().await {
                Ok(ReadinessEvent::Secure) => return Ok(()),
                Ok(ReadinessEvent::SecureRandomError(err)) => return Err(err),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return Err(EntropyError::ChannelClosed),
            }
        }
    }
}
