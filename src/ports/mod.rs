//! Ports (traits) the shim core depends on
//!
//! The core never names a concrete engine or random source; it is written
//! against these abstractions and adapters plug in at construction time.

mod crypto_engine;
mod entropy_source;

pub use crypto_engine::CryptoEngine;
pub use entropy_source::EntropySource;
