//! Runtime configuration

/// Number of seed bytes requested from the random source at startup
pub const DEFAULT_SEED_LENGTH: usize = 48;

/// Configuration for seeding and source selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimConfig {
    /// Bytes drawn from the random source to seed the engine
    pub seed_length: usize,
    /// Seed from a non-cryptographic generator when no secure source exists
    ///
    /// Enabled by default so that constrained hosts stay usable; a warning is
    /// logged whenever the fallback is taken.
    pub allow_insecure_fallback: bool,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            seed_length: DEFAULT_SEED_LENGTH,
            allow_insecure_fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ShimConfig::default();
        assert_eq!(config.seed_length, 48);
        assert!(config.allow_insecure_fallback);
    }
}
