use std::sync::Arc;

use tracing::{debug, warn};

use crate::adapters::{InsecureEntropySource, OsEntropySource};
use crate::config::ShimConfig;
use crate::error::EntropyError;
use crate::ports::EntropySource;

/// Pick a random source for seeding on this host
///
/// Prefers the operating system CSPRNG. See [`select_from`] for the fallback
/// rules.
pub fn select_entropy_source(config: &ShimConfig) -> Result<Arc<dyn EntropySource>, EntropyError> {
    let platform = match OsEntropySource::probe() {
        Ok(source) => Some(Arc::new(source) as Arc<dyn EntropySource>),
        Err(err) => {
            debug!(%err, "platform random source probe failed");
            None
        }
    };
    select_from(platform, config)
}

/// Use `candidate` if present, otherwise fall back to an insecure generator
/// when the configuration allows it
pub fn select_from(
    candidate: Option<Arc<dyn EntropySource>>,
    config: &ShimConfig,
) -> Result<Arc<dyn EntropySource>, EntropyError> {
    if let Some(source) = candidate {
        debug!(source = source.name(), secure = source.is_secure(), "selected random source");
        return Ok(source);
    }

    if !config.allow_insecure_fallback {
        return Err(EntropyError::Unavailable {
            reason: "no platform random source and insecure fallback is disabled".to_string(),
        });
    }

    warn!(
        "No secure random source is available on this host. Falling back to a \
         non-cryptographic generator: random values, generated keys and nonces \
         are NOT unpredictable. Provide a platform random source to fix this."
    );
    Ok(Arc::new(InsecureEntropySource::new()))
}
