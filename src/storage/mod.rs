//! Derivative identity and persistence.
//!
//! - [`IdentityAllocator`]: names derivatives `{nanoseconds}{ext}`
//! - [`DerivativeStore`]: writes derivatives under a content root
//! - [`LocalDirStore`]: the local-directory store

mod identity;
mod local;

pub use identity::{Clock, IdentityAllocator, SystemClock};
pub use local::{DerivativeStore, LocalDirStore};
