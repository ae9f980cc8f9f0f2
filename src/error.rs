//! Error types for portable-subtle
//!
//! This module defines the error hierarchy for the shim.
//! Errors are organized hierarchically and use thiserror for implementation.

use thiserror::Error;

/// Result type alias for shim operations
///
/// This is a convenience alias for `Result<T, ShimError>`.
pub type ShimResult<T> = Result<T, ShimError>;

/// Result type alias used by [`crate::ports::CryptoEngine`] implementations
pub type EngineResult<T> = Result<T, EngineError>;

/// Top-level error type for all shim operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShimError {
    /// Secure seeding failed; permanent for the lifetime of the facade
    #[error("Secure random source error: {0}")]
    Entropy(#[from] EntropyError),

    /// The raw random accessor was called before seeding completed
    #[error(
        "getRandomValues called before the engine was secured; \
         await ensure_secure() before requesting random values"
    )]
    NotYetSecure,

    /// Failure reported by the underlying engine, relayed unchanged
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Malformed key material met while normalising metadata
    #[error("Key data format error: {0}")]
    Format(#[from] FormatError),
}

/// Entropy acquisition errors
///
/// Cloneable so that a single failure can be replayed to every waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntropyError {
    /// No secure source exists and the insecure fallback is disabled
    #[error("No secure random source is available: {reason}")]
    Unavailable { reason: String },

    /// The source exists but rejected the request
    #[error("Random source {source_name} failed: {reason}")]
    SourceFailed { source_name: String, reason: String },

    /// The source returned fewer bytes than requested
    #[error("Random source returned {actual} bytes, expected {expected}")]
    ShortRead { expected: usize, actual: usize },

    /// The engine refused the seed bytes
    #[error("Engine rejected seed material: {reason}")]
    SeedRejected { reason: String },

    /// Readiness channel closed before settling
    #[error("Readiness channel closed before seeding settled")]
    ChannelClosed,
}

/// Errors produced by a crypto engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Algorithm (or algorithm/operation pairing) not implemented by the engine
    #[error("Operation {operation} not supported for algorithm {algorithm}")]
    NotSupported {
        operation: &'static str,
        algorithm: String,
    },

    /// Missing or invalid algorithm parameters
    #[error("Invalid algorithm parameters: {reason}")]
    InvalidParameters { reason: String },

    /// The key cannot be used for the requested operation
    #[error("Invalid key: {reason}")]
    InvalidKey { reason: String },

    /// Key data does not match the declared format
    #[error("Key data does not match format {format}: {reason}")]
    DataError { format: String, reason: String },

    /// Key is not extractable
    #[error("Key is not extractable")]
    NotExtractable,

    /// The primitive itself failed (e.g. authentication tag mismatch)
    #[error("Operation failed: {reason}")]
    OperationFailed { reason: String },

    /// The engine PRNG has not been seeded
    #[error("Engine PRNG has not been seeded")]
    Unseeded,
}

/// Errors met while decoding key material during normalisation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A base64url JWK member could not be decoded
    #[error("JWK member `{member}` is not valid base64url: {reason}")]
    InvalidBase64Url { member: &'static str, reason: String },

    /// A required JWK member is absent
    #[error("JWK member `{member}` is missing")]
    MissingMember { member: &'static str },

    /// Decoded RSA modulus is too long to express its bit length
    #[error("RSA modulus of {bytes} bytes is too large")]
    ModulusTooLarge { bytes: usize },
}

impl From<base64::DecodeError> for EngineError {
    fn from(err: base64::DecodeError) -> Self {
        EngineError::DataError {
            format: "jwk".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<ed25519_dalek::SignatureError> for EngineError {
    fn from(err: ed25519_dalek::SignatureError) -> Self {
        EngineError::InvalidKey {
            reason: format!("Ed25519: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ShimError::NotYetSecure;
        assert!(err.to_string().contains("ensure_secure"));
    }

    #[test]
    fn test_entropy_error_conversion() {
        let err: ShimError = EntropyError::Unavailable {
            reason: "no platform source".to_string(),
        }
        .into();
        assert!(matches!(err, ShimError::Entropy(EntropyError::Unavailable { .. })));
        assert!(err.to_string().contains("no platform source"));
    }

    #[test]
    fn test_engine_error_is_transparent() {
        let engine_err = EngineError::OperationFailed {
            reason: "tag mismatch".to_string(),
        };
        let err = ShimError::from(engine_err.clone());
        assert_eq!(err.to_string(), engine_err.to_string());
    }

    #[test]
    fn test_result_type_alias() {
        let result: ShimResult<i32> = Ok(42);
        assert_eq!(result.unwrap(), 42);

        let result: ShimResult<i32> = Err(ShimError::NotYetSecure);
        assert!(result.is_err());
    }
}
