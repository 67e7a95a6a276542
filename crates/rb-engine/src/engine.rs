//! The [`Engine`] trait defining the call surface of the processing engine.

use std::path::Path;

use rb_core::{ConversionProgress, ImageProgress, Metadata};

use crate::container::PendingContainer;

/// How a processing run ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// All work finished and the terminal `on_completed` callback was invoked.
    Completed,
    /// A progress callback returned `false`; the engine stopped without
    /// calling `on_completed` and left no partially written output behind.
    Cancelled,
}

/// Parameters for a video-to-still conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoOptions {
    /// Concurrency the engine may use internally.
    pub worker_threads: u32,
    /// Number of consecutive frames merged into one output unit. Always at
    /// least 1; a container with `n` frames yields `ceil(n / merge_frames)`
    /// units.
    pub merge_frames: u32,
}

impl VideoOptions {
    /// Number of output units a container of `frame_count` frames produces.
    pub fn output_units(&self, frame_count: u32) -> u32 {
        frame_count.div_ceil(self.merge_frames.max(1))
    }
}

/// A native media engine driven by the bridge.
///
/// Every call runs synchronously on the caller's thread and invokes the
/// listener on that same thread. Implementations check the return value of
/// each `on_progress_update` and return [`RunStatus::Cancelled`] promptly when
/// it is `false`. Any `Err` returned by a listener method is a fatal boundary
/// failure and must be propagated unchanged.
pub trait Engine: Send + Sync {
    /// Human-readable name identifying this engine implementation.
    fn name(&self) -> &'static str;

    /// Develop an in-memory container into `output`.
    ///
    /// The container is moved in; the engine releases its buffers when it is
    /// done with them.
    fn process_container(
        &self,
        container: PendingContainer,
        output: &Path,
        listener: &mut dyn ImageProgress,
    ) -> rb_core::Result<RunStatus>;

    /// Develop the container stored at `input` into `output`.
    fn process_file(
        &self,
        input: &Path,
        output: &Path,
        listener: &mut dyn ImageProgress,
    ) -> rb_core::Result<RunStatus>;

    /// Convert the video container at `input` into still frames, requesting an
    /// output resource from the listener for each unit.
    fn convert_video(
        &self,
        input: &Path,
        options: &VideoOptions,
        listener: &mut dyn ConversionProgress,
    ) -> rb_core::Result<RunStatus>;

    /// Inspect the container at `input` without side effects.
    fn metadata(&self, input: &Path) -> rb_core::Result<Metadata>;
}
