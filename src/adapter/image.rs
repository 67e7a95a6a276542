//! Adapter forwarding [`ImageProgress`] calls to a host listener table.

use std::ffi::{c_char, c_int, c_void};
use std::path::Path;

use rb_core::{Error, ImageProgress, Result};

use super::handle::{ListenerHandle, ReleaseFn, RetainFn};
use super::value;

/// Host-side image listener, laid out for the C ABI.
///
/// Every callback receives the listener handle (the retained context, or
/// `context` itself when no `retain` is supplied) as its first argument.
/// A `None` entry means the host does not implement that callback; invoking it
/// fails the call with [`Error::MissingCallback`].
#[repr(C)]
#[derive(Debug)]
pub struct RbImageListener {
    pub context: *mut c_void,
    pub retain: Option<RetainFn>,
    pub release: Option<ReleaseFn>,
    /// Receives the preview path, returns a host-allocated metadata string.
    pub on_preview_saved:
        Option<unsafe extern "C" fn(handle: *mut c_void, path: *const c_char) -> *mut c_char>,
    /// Frees a string returned by `on_preview_saved`. Optional.
    pub free_string: Option<unsafe extern "C" fn(handle: *mut c_void, value: *mut c_char)>,
    /// Returns the host boolean; anything but `1` requests cancellation.
    pub on_progress_update: Option<unsafe extern "C" fn(handle: *mut c_void, percent: c_int) -> u8>,
    pub on_completed: Option<unsafe extern "C" fn(handle: *mut c_void)>,
    pub on_error: Option<unsafe extern "C" fn(handle: *mut c_void, message: *const c_char)>,
}

/// [`ImageProgress`] implementation backed by a host [`RbImageListener`].
///
/// Holds a [`ListenerHandle`] for the lifetime of one call; dropping the
/// adapter releases it.
#[derive(Debug)]
pub struct HostImageListener<'call> {
    table: &'call RbImageListener,
    handle: ListenerHandle<'call>,
}

impl<'call> HostImageListener<'call> {
    /// Attach to a host listener table, acquiring its handle.
    ///
    /// # Safety
    ///
    /// Every function pointer in `table` must be safe to call with the
    /// listener handle for as long as the adapter lives.
    pub unsafe fn attach(table: &'call RbImageListener) -> Result<Self> {
        let handle = unsafe { ListenerHandle::acquire(table.context, table.retain, table.release) }?;
        Ok(Self { table, handle })
    }

    pub fn handle(&self) -> &ListenerHandle<'call> {
        &self.handle
    }
}

impl ImageProgress for HostImageListener<'_> {
    fn on_preview_saved(&mut self, path: &Path) -> Result<String> {
        let callback = self
            .table
            .on_preview_saved
            .ok_or(Error::MissingCallback("on_preview_saved"))?;
        let path = value::path_to_host(path)?;

        let raw = unsafe { callback(self.handle.as_ptr(), path.as_ptr()) };
        let metadata = unsafe { value::from_host_str(raw, "on_preview_saved result") };
        if !raw.is_null() {
            if let Some(free) = self.table.free_string {
                unsafe { free(self.handle.as_ptr(), raw) };
            }
        }

        tracing::trace!(bytes = metadata.as_ref().map_or(0, String::len), "Preview metadata received");
        metadata
    }

    fn on_progress_update(&mut self, percent: i32) -> Result<bool> {
        let callback = self
            .table
            .on_progress_update
            .ok_or(Error::MissingCallback("on_progress_update"))?;
        let keep_going = value::host_bool(unsafe { callback(self.handle.as_ptr(), percent) });
        tracing::debug!(percent, keep_going, "Image progress");
        Ok(keep_going)
    }

    fn on_completed(&mut self) -> Result<()> {
        let callback = self
            .table
            .on_completed
            .ok_or(Error::MissingCallback("on_completed"))?;
        unsafe { callback(self.handle.as_ptr()) };
        Ok(())
    }

    fn on_error(&mut self, message: &str) -> Result<()> {
        let callback = self
            .table
            .on_error
            .ok_or(Error::MissingCallback("on_error"))?;
        let message = value::to_host_string(message)?;
        unsafe { callback(self.handle.as_ptr(), message.as_ptr()) };
        Ok(())
    }
}
