//! Standard subtle-crypto surface over a portable engine
//!
//! Wraps a [`CryptoEngine`] so that callers get an always-available object
//! whose operations wait until the engine has been seeded from a secure
//! random source, and whose key metadata follows the standard conventions.

mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
mod logic;
pub mod model;
pub mod ports;

// Re-export commonly used types
pub use error::{EngineError, EngineResult, EntropyError, FormatError, ShimError, ShimResult};

// Re-export public API
pub use adapters::{InsecureEntropySource, OsEntropySource, SoftwareEngine};
pub use api::{standardize_algorithm_name, Crypto};
pub use config::ShimConfig;
pub use domain::{Operation, Readiness, ReadinessEvent, ReadinessState, SubtleCrypto};
pub use logic::entropy_selection::{select_entropy_source, select_from};
pub use ports::{CryptoEngine, EntropySource};
