//! Conversion driver: the entry points that hand work to the engine.
//!
//! Each operation runs synchronously on the caller's thread inside a tracing
//! span tagged with a fresh [`CallId`]. Failures come back as the `Err` of the
//! call itself; a declined or cancelled run is a normal [`Outcome`].

use std::path::Path;
use std::sync::Arc;

use rb_core::config::BridgeConfig;
use rb_core::{CallId, ConversionProgress, Error, ImageProgress, Metadata, Result};
use rb_engine::{ContainerRegistry, Engine, RunStatus, VideoOptions};

/// How a driver call ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The engine finished and reported completion.
    Completed,
    /// The listener requested cancellation from a progress callback.
    Cancelled,
    /// There was no work to do (no pending container).
    Declined,
}

impl Outcome {
    pub fn is_completed(self) -> bool {
        matches!(self, Outcome::Completed)
    }
}

impl From<RunStatus> for Outcome {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Completed => Outcome::Completed,
            RunStatus::Cancelled => Outcome::Cancelled,
        }
    }
}

/// Drives an [`Engine`] on behalf of a caller-supplied listener.
pub struct ConversionDriver<E: Engine + ?Sized> {
    engine: Arc<E>,
    registry: Arc<ContainerRegistry>,
    config: BridgeConfig,
}

impl<E: Engine + ?Sized> ConversionDriver<E> {
    /// Create a driver over `engine` using the process-wide container registry
    /// and default configuration.
    pub fn new(engine: Arc<E>) -> Self {
        Self {
            engine,
            registry: ContainerRegistry::global(),
            config: BridgeConfig::default(),
        }
    }

    /// Builder: take pending containers from `registry` instead of the
    /// process-wide one.
    pub fn with_registry(mut self, registry: Arc<ContainerRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Builder: set the configuration.
    pub fn with_config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    pub fn registry(&self) -> &Arc<ContainerRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Develop the next pending in-memory container into `output`.
    ///
    /// Returns [`Outcome::Declined`] without touching the engine or the
    /// listener when nothing is pending.
    pub fn process_in_memory(
        &self,
        output: &Path,
        listener: &mut dyn ImageProgress,
    ) -> Result<Outcome> {
        let call = CallId::new();
        let span = tracing::info_span!("process_in_memory", %call, output = %output.display());
        let _enter = span.enter();

        let Some(container) = self.registry.take() else {
            tracing::debug!("No pending container; nothing to process");
            return Ok(Outcome::Declined);
        };

        tracing::info!(
            container = %container.id(),
            frames = container.frame_count(),
            engine = self.engine.name(),
            "Processing pending container"
        );
        self.finish(self.engine.process_container(container, output, listener))
    }

    /// Develop the container stored at `input` into `output`.
    pub fn process_file(
        &self,
        input: &Path,
        output: &Path,
        listener: &mut dyn ImageProgress,
    ) -> Result<Outcome> {
        let call = CallId::new();
        let span = tracing::info_span!(
            "process_file",
            %call,
            input = %input.display(),
            output = %output.display()
        );
        let _enter = span.enter();

        tracing::info!(engine = self.engine.name(), "Processing file");
        self.finish(self.engine.process_file(input, output, listener))
    }

    /// Convert the video container at `input` into stills, merging
    /// `frame_merge_count` consecutive frames into each output unit.
    pub fn convert_video(
        &self,
        input: &Path,
        frame_merge_count: u32,
        listener: &mut dyn ConversionProgress,
    ) -> Result<Outcome> {
        let call = CallId::new();
        let span = tracing::info_span!(
            "convert_video",
            %call,
            input = %input.display(),
            merge = frame_merge_count
        );
        let _enter = span.enter();

        if frame_merge_count == 0 {
            let err = Error::invalid_argument("frame merge count must be at least 1");
            tracing::warn!(error = %err, "Rejected conversion request");
            return Err(err);
        }

        let options = VideoOptions {
            worker_threads: self.config.video.effective_worker_threads(),
            merge_frames: frame_merge_count,
        };
        tracing::info!(
            engine = self.engine.name(),
            worker_threads = options.worker_threads,
            "Converting video"
        );
        self.finish(self.engine.convert_video(input, &options, listener))
    }

    /// Inspect the container at `input`.
    pub fn metadata(&self, input: &Path) -> Result<Metadata> {
        let call = CallId::new();
        let span = tracing::info_span!("metadata", %call, input = %input.display());
        let _enter = span.enter();

        match self.engine.metadata(input) {
            Ok(meta) => {
                tracing::debug!(
                    frame_rate = meta.frame_rate,
                    frame_count = meta.frame_count,
                    "Metadata read"
                );
                Ok(meta)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Metadata inspection failed");
                Err(e)
            }
        }
    }

    fn finish(&self, result: Result<RunStatus>) -> Result<Outcome> {
        match result {
            Ok(status) => {
                let outcome = Outcome::from(status);
                tracing::info!(?outcome, "Engine call finished");
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    boundary = e.is_boundary_fault(),
                    "Engine call failed"
                );
                Err(e)
            }
        }
    }
}

impl<E: Engine + ?Sized> std::fmt::Debug for ConversionDriver<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionDriver")
            .field("engine", &self.engine.name())
            .field("pending", &self.registry.len())
            .field("config", &self.config)
            .finish()
    }
}
