//! rawbridge - callback bridge between foreign hosts and a native raw media engine
//!
//! The library exposes the conversion driver to Rust callers, adapts C listener
//! tables to the engine's listener traits, and exports the C ABI used by hosts
//! in other runtimes.

pub mod adapter;
pub mod cli;
pub mod driver;
pub mod ffi;
pub mod last_error;
pub mod logging;

pub use driver::{ConversionDriver, Outcome};
pub use ffi::{install, installed};
pub use last_error::{clear_last_error, last_error};
