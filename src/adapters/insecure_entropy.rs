//! Non-cryptographic fallback source
//!
//! Only used when the host offers no secure source and the configuration
//! permits it. Output is predictable to anyone who can guess the start time.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::error::EntropyError;
use crate::ports::EntropySource;

#[derive(Debug)]
pub struct InsecureEntropySource {
    rng: Mutex<SmallRng>,
}

impl InsecureEntropySource {
    pub const NAME: &'static str = "insecure-prng";

    pub fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::with_seed(nanos)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl Default for InsecureEntropySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntropySource for InsecureEntropySource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_secure(&self) -> bool {
        false
    }

    async fn provide(&self, length: usize) -> Result<Vec<u8>, EntropyError> {
        let mut rng = self.rng.lock().map_err(|_| EntropyError::SourceFailed {
            source_name: Self::NAME.to_string(),
            reason: "generator lock poisoned".to_string(),
        })?;
        let mut bytes = vec![0u8; length];
        rng.fill_bytes(&mut bytes);
        Ok(bytes)
    }
}
