mod algorithm;
mod buffer;
mod jwk;
mod key;

pub use algorithm::{Algorithm, HashAlgorithm, KeyAlgorithm};
pub use buffer::BufferSource;
pub use jwk::{JsonWebKey, KeyData, KeyFormat};
pub use key::{CryptoKey, CryptoKeyPair, GeneratedKey, KeyMaterial, KeyType, KeyUsage};
