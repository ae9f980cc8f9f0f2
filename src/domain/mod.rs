//! Core of the shim: readiness tracking and the gated subtle surface
//!
//! Nothing in here knows which engine or random source is in use; both come
//! in through the traits in [`crate::ports`].

mod operation;
mod readiness;
mod subtle;

pub use operation::Operation;
pub use readiness::{Readiness, ReadinessEvent, ReadinessState};
pub use subtle::SubtleCrypto;
