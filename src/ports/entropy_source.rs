use async_trait::async_trait;

use crate::error::EntropyError;

/// Asynchronous random byte provider used to seed an engine
#[async_trait]
pub trait EntropySource: Send + Sync {
    /// Short identifier used in logs and errors
    fn name(&self) -> &'static str;

    /// Whether the output meets cryptographic unpredictability requirements
    fn is_secure(&self) -> bool;

    /// Produce exactly `length` random bytes
    async fn provide(&self, length: usize) -> Result<Vec<u8>, EntropyError>;
}
