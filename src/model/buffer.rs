//! Canonical byte representation for data arguments

/// Data accepted by `digest` and `sign`
///
/// Callers may pass text, an owned buffer, or a byte slice interchangeably;
/// all collapse to the same byte sequence before reaching the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferSource {
    /// Text, encoded as UTF-8
    Text(String),
    /// Whole owned buffer
    ArrayBuffer(Vec<u8>),
    /// View over bytes
    Bytes(Vec<u8>),
}

impl BufferSource {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            BufferSource::Text(text) => text.into_bytes(),
            BufferSource::ArrayBuffer(bytes) | BufferSource::Bytes(bytes) => bytes,
        }
    }
}

impl From<&str> for BufferSource {
    fn from(text: &str) -> Self {
        BufferSource::Text(text.to_owned())
    }
}

impl From<String> for BufferSource {
    fn from(text: String) -> Self {
        BufferSource::Text(text)
    }
}

impl From<Vec<u8>> for BufferSource {
    fn from(bytes: Vec<u8>) -> Self {
        BufferSource::ArrayBuffer(bytes)
    }
}

impl From<&[u8]> for BufferSource {
    fn from(bytes: &[u8]) -> Self {
        BufferSource::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for BufferSource {
    fn from(bytes: &[u8; N]) -> Self {
        BufferSource::Bytes(bytes.to_vec())
    }
}
