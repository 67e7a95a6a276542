//! # rb-engine
//!
//! The seam between rawbridge and the native processing engine.
//!
//! The engine itself (raw decoding, demosaicing, DNG encoding, buffer pooling)
//! lives outside this workspace. This crate only fixes its call signatures in
//! the [`Engine`] trait and owns the process-wide [`ContainerRegistry`] through
//! which the capture side hands in-memory containers to the conversion side.

pub mod container;
pub mod engine;

// Re-export key types at crate root for convenience.
pub use container::{ContainerRegistry, PendingContainer, RawFrame};
pub use engine::{Engine, RunStatus, VideoOptions};
