//! Platform secure random source backed by the operating system RNG

use async_trait::async_trait;
use rand::rngs::OsRng;
use rand::TryRngCore;
use tracing::debug;

use crate::error::EntropyError;
use crate::ports::EntropySource;

/// Operating-system CSPRNG (`getrandom`)
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropySource;

impl OsEntropySource {
    pub const NAME: &'static str = "os";

    /// Draw a single byte to check the platform source works on this host
    pub fn probe() -> Result<Self, EntropyError> {
        let mut byte = [0u8; 1];
        OsRng
            .try_fill_bytes(&mut byte)
            .map_err(|e| EntropyError::SourceFailed {
                source_name: Self::NAME.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self)
    }
}

#[async_trait]
impl EntropySource for OsEntropySource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_secure(&self) -> bool {
        true
    }

    async fn provide(&self, length: usize) -> Result<Vec<u8>, EntropyError> {
        let mut bytes = vec![0u8; length];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| EntropyError::SourceFailed {
                source_name: Self::NAME.to_string(),
                reason: e.to_string(),
            })?;
        debug!(length, "drew bytes from OS random source");
        Ok(bytes)
    }
}
