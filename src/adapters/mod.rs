//! Adapters - concrete implementations of ports (traits)

mod insecure_entropy;
mod os_entropy;
mod software;

#[cfg(test)]
pub mod fake_engine;
#[cfg(test)]
pub mod fake_entropy;

// Re-export for convenience
pub use insecure_entropy::InsecureEntropySource;
pub use os_entropy::OsEntropySource;
pub use software::SoftwareEngine;
