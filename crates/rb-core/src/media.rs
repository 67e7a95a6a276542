//! Media-domain value types exchanged between the engine and the host.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Frame rate and frame count of a container, as reported by inspection.
///
/// `#[repr(C)]` so the same value can be written straight into a host
/// out-parameter.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub frame_rate: f32,
    pub frame_count: i32,
}

impl Metadata {
    pub fn new(frame_rate: f32, frame_count: i32) -> Self {
        Self {
            frame_rate,
            frame_count,
        }
    }

    /// Duration of the container in seconds, if the frame rate is usable.
    pub fn duration_secs(&self) -> Option<f64> {
        if self.frame_rate > 0.0 && self.frame_count >= 0 {
            Some(f64::from(self.frame_count) / f64::from(self.frame_rate))
        } else {
            None
        }
    }
}

/// A file-descriptor-like token handed out by a conversion listener.
///
/// Negative values mean the listener could not provide a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceHandle(i32);

impl ResourceHandle {
    /// Sentinel a listener returns when it cannot provide a resource.
    pub const INVALID: ResourceHandle = ResourceHandle(-1);

    pub fn new(raw: i32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> i32 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }

    /// The raw token when valid, `None` otherwise.
    pub fn valid(self) -> Option<i32> {
        self.is_valid().then_some(self.0)
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fd:{}", self.0)
    }
}
