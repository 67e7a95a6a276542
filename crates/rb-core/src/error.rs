//! Unified error type for rawbridge.
//!
//! Engine, adapter and driver failures all funnel into [`Error`]. The boundary
//! layer records an error's display text in the last-error slot, so every
//! variant renders a message a host can show as is.

use std::fmt;

/// Unified error type covering all failure modes in rawbridge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The engine failed while processing. Displays the engine's message
    /// verbatim.
    #[error("{0}")]
    Engine(String),

    /// The listener could not provide an output resource for a frame.
    #[error("listener could not provide a resource for frame {frame_index}")]
    ResourceUnavailable {
        /// Index of the frame the engine was about to write.
        frame_index: i32,
    },

    /// The host listener does not implement a callback the engine invoked.
    #[error("listener is missing callback `{0}`")]
    MissingCallback(&'static str),

    /// A value could not be translated across the host boundary.
    #[error("Boundary error: {0}")]
    Boundary(String),

    /// The caller passed an argument the bridge cannot act on.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No engine has been registered with the bridge.
    #[error("no engine installed")]
    NotInstalled,

    /// Configuration failed validation or parsing.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// Whether this error originated at the host boundary rather than in the
    /// engine.
    ///
    /// Boundary faults are fatal for the call that hit them and are never
    /// retried.
    pub fn is_boundary_fault(&self) -> bool {
        matches!(
            self,
            Error::MissingCallback(_) | Error::Boundary(_) | Error::NotInstalled
        )
    }

    /// Convenience constructor for [`Error::Engine`].
    pub fn engine(message: impl Into<String>) -> Self {
        Error::Engine(message.into())
    }

    /// Convenience constructor for [`Error::Boundary`].
    pub fn boundary(message: impl fmt::Display) -> Self {
        Error::Boundary(message.to_string())
    }

    /// Convenience constructor for [`Error::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
