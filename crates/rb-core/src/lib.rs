//! rb-core: shared types, errors, configuration, listener contracts and locking.
//!
//! This crate is the foundational dependency for the other rawbridge crates,
//! providing the unified error type, typed identifiers, the progress listener
//! contracts the engine calls into, and the reentrant lock used to guard state
//! shared between producer and consumer contexts.

pub mod config;
pub mod error;
pub mod ids;
pub mod lock;
pub mod media;
pub mod progress;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::*;
pub use lock::{ReentrantLock, ScopedReentrantLock};
pub use media::{Metadata, ResourceHandle};
pub use progress::{ConversionProgress, ImageProgress};
