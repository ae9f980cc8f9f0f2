use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::error::{EngineError, EngineResult};

/// Digest algorithms understood by the software engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HashKind {
    Sha256,
    Sha384,
    Sha512,
}

impl HashKind {
    pub(crate) fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sha-256" => Some(HashKind::Sha256),
            "sha-384" => Some(HashKind::Sha384),
            "sha-512" => Some(HashKind::Sha512),
            _ => None,
        }
    }

    pub(crate) fn require(name: Option<&str>, operation: &'static str) -> EngineResult<Self> {
        let name = name.ok_or_else(|| EngineError::InvalidParameters {
            reason: format!("{operation} requires a hash"),
        })?;
        Self::parse(name).ok_or_else(|| EngineError::NotSupported {
            operation,
            algorithm: name.to_string(),
        })
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            HashKind::Sha256 => "SHA-256",
            HashKind::Sha384 => "SHA-384",
            HashKind::Sha512 => "SHA-512",
        }
    }

    /// Digest size in bits, used as the JWS algorithm suffix
    pub(crate) fn bits(self) -> u32 {
        match self {
            HashKind::Sha256 => 256,
            HashKind::Sha384 => 384,
            HashKind::Sha512 => 512,
        }
    }

    /// Block size in bits, the default HMAC key length
    pub(crate) fn block_bits(self) -> u32 {
        match self {
            HashKind::Sha256 => 512,
            HashKind::Sha384 | HashKind::Sha512 => 1024,
        }
    }

    pub(crate) fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            HashKind::Sha256 => Sha256::digest(data).to_vec(),
            HashKind::Sha384 => Sha384::digest(data).to_vec(),
            HashKind::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(HashKind::parse("SHA-384"), Some(HashKind::Sha384));
        assert_eq!(HashKind::parse("sha-512"), Some(HashKind::Sha512));
        assert_eq!(HashKind::parse("sha-1"), None);
    }

    #[test]
    fn test_digest_lengths() {
        assert_eq!(HashKind::Sha256.digest(b"").len(), 32);
        assert_eq!(HashKind::Sha384.digest(b"").len(), 48);
        assert_eq!(HashKind::Sha512.digest(b"").len(), 64);
    }

    #[test]
    fn test_require_missing_hash() {
        let err = HashKind::require(None, "sign").unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameters { .. }));
    }
}
