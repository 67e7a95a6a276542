//! Bridge configuration types.
//!
//! [`BridgeConfig`] is deserialized from JSON. Every section defaults
//! sensibly so a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::Error;

/// Worker threads handed to the engine for video-to-still conversion.
pub const DEFAULT_VIDEO_WORKER_THREADS: u32 = 4;

/// Root bridge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub video: VideoConfig,
    pub logging: LoggingConfig,
}

impl BridgeConfig {
    /// Deserialize a `BridgeConfig` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None`, the file does not exist, or it fails to parse.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.video.worker_threads == 0 {
            warnings.push(format!(
                "video.worker_threads is 0; the engine will fall back to {DEFAULT_VIDEO_WORKER_THREADS}"
            ));
        }

        if self.logging.filter.trim().is_empty() {
            warnings.push("logging.filter is empty; nothing will be logged".into());
        }

        warnings
    }
}

/// Video-to-still conversion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Concurrency the engine may use while converting a container.
    pub worker_threads: u32,
}

impl VideoConfig {
    /// Worker thread count with a zero value replaced by the default.
    pub fn effective_worker_threads(&self) -> u32 {
        if self.worker_threads == 0 {
            DEFAULT_VIDEO_WORKER_THREADS
        } else {
            self.worker_threads
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            worker_threads: DEFAULT_VIDEO_WORKER_THREADS,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
        }
    }
}
