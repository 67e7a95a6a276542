//! Listener contracts the engine calls into during long-running work.
//!
//! Both traits are synchronous and are always invoked on the thread that
//! called into the driver. Every method returns a [`Result`] so that a listener
//! living on the far side of the host boundary can fail the call when a
//! callback cannot be resolved or a value cannot be translated.
//!
//! Implementations must not block indefinitely and must not call back into the
//! driver from inside a callback.

use std::path::Path;

use crate::error::Result;
use crate::media::ResourceHandle;

/// Progress contract for developing a single image (in-memory container or
/// file).
pub trait ImageProgress {
    /// The engine saved a preview at `path`; the host persists or annotates it
    /// and returns a metadata string the engine embeds in its output.
    fn on_preview_saved(&mut self, path: &Path) -> Result<String>;

    /// Report progress as a percentage.
    ///
    /// Returning `Ok(false)` requests cancellation. The engine checks the
    /// value after every call and stops without calling
    /// [`on_completed`](ImageProgress::on_completed).
    fn on_progress_update(&mut self, percent: i32) -> Result<bool>;

    /// The whole operation finished successfully.
    fn on_completed(&mut self) -> Result<()>;

    /// The operation failed with `message`.
    fn on_error(&mut self, message: &str) -> Result<()>;
}

/// Progress contract for converting a video container into still frames.
pub trait ConversionProgress {
    /// The engine is about to write output unit `frame_index` and needs a
    /// resource to write it to. A negative handle means the listener cannot
    /// provide one and the engine aborts.
    fn on_need_fd(&mut self, frame_index: i32) -> Result<ResourceHandle>;

    /// Report progress as a percentage. `Ok(false)` requests cancellation.
    fn on_progress_update(&mut self, percent: i32) -> Result<bool>;

    /// The engine finished writing the resource `handle`.
    fn on_resource_completed(&mut self, handle: ResourceHandle) -> Result<()>;

    /// The whole job finished successfully.
    fn on_completed(&mut self) -> Result<()>;

    /// The job failed with `message`.
    fn on_error(&mut self, message: &str) -> Result<()>;
}

impl<T: ImageProgress + ?Sized> ImageProgress for &mut T {
    fn on_preview_saved(&mut self, path: &Path) -> Result<String> {
        (**self).on_preview_saved(path)
    }

    fn on_progress_update(&mut self, percent: i32) -> Result<bool> {
        (**self).on_progress_update(percent)
    }

    fn on_completed(&mut self) -> Result<()> {
        (**self).on_completed()
    }

    fn on_error(&mut self, message: &str) -> Result<()> {
        (**self).on_error(message)
    }
}

impl<T: ConversionProgress + ?Sized> ConversionProgress for &mut T {
    fn on_need_fd(&mut self, frame_index: i32) -> Result<ResourceHandle> {
        (**self).on_need_fd(frame_index)
    }

    fn on_progress_update(&mut self, percent: i32) -> Result<bool> {
        (**self).on_progress_update(percent)
    }

    fn on_resource_completed(&mut self, handle: ResourceHandle) -> Result<()> {
        (**self).on_resource_completed(handle)
    }

    fn on_completed(&mut self) -> Result<()> {
        (**self).on_completed()
    }

    fn on_error(&mut self, message: &str) -> Result<()> {
        (**self).on_error(message)
    }
}
