//! Adapter forwarding [`ConversionProgress`] calls to a host listener table.

use std::ffi::{c_char, c_int, c_void};

use rb_core::{ConversionProgress, Error, ResourceHandle, Result};

use super::handle::{ListenerHandle, ReleaseFn, RetainFn};
use super::value;

/// Host-side conversion listener, laid out for the C ABI.
///
/// Same conventions as [`RbImageListener`](super::RbImageListener).
#[repr(C)]
#[derive(Debug)]
pub struct RbConversionListener {
    pub context: *mut c_void,
    pub retain: Option<RetainFn>,
    pub release: Option<ReleaseFn>,
    /// Returns an open resource handle for output unit `frame_index`, or a
    /// negative value if none can be provided.
    pub on_need_fd: Option<unsafe extern "C" fn(handle: *mut c_void, frame_index: c_int) -> c_int>,
    pub on_progress_update: Option<unsafe extern "C" fn(handle: *mut c_void, percent: c_int) -> u8>,
    /// Per-resource completion.
    pub on_resource_completed: Option<unsafe extern "C" fn(handle: *mut c_void, fd: c_int)>,
    /// Whole-job completion.
    pub on_completed: Option<unsafe extern "C" fn(handle: *mut c_void)>,
    pub on_error: Option<unsafe extern "C" fn(handle: *mut c_void, message: *const c_char)>,
}

/// [`ConversionProgress`] implementation backed by a host
/// [`RbConversionListener`].
#[derive(Debug)]
pub struct HostConversionListener<'call> {
    table: &'call RbConversionListener,
    handle: ListenerHandle<'call>,
}

impl<'call> HostConversionListener<'call> {
    /// Attach to a host listener table, acquiring its handle.
    ///
    /// # Safety
    ///
    /// Every function pointer in `table` must be safe to call with the
    /// listener handle for as long as the adapter lives.
    pub unsafe fn attach(table: &'call RbConversionListener) -> Result<Self> {
        let handle = unsafe { ListenerHandle::acquire(table.context, table.retain, table.release) }?;
        Ok(Self { table, handle })
    }

    pub fn handle(&self) -> &ListenerHandle<'call> {
        &self.handle
    }
}

impl ConversionProgress for HostConversionListener<'_> {
    fn on_need_fd(&mut self, frame_index: i32) -> Result<ResourceHandle> {
        let callback = self
            .table
            .on_need_fd
            .ok_or(Error::MissingCallback("on_need_fd"))?;
        let fd = ResourceHandle::new(unsafe { callback(self.handle.as_ptr(), frame_index) });
        tracing::trace!(frame_index, %fd, "Resource requested");
        Ok(fd)
    }

    fn on_progress_update(&mut self, percent: i32) -> Result<bool> {
        let callback = self
            .table
            .on_progress_update
            .ok_or(Error::MissingCallback("on_progress_update"))?;
        let keep_going = value::host_bool(unsafe { callback(self.handle.as_ptr(), percent) });
        tracing::debug!(percent, keep_going, "Conversion progress");
        Ok(keep_going)
    }

    fn on_resource_completed(&mut self, fd: ResourceHandle) -> Result<()> {
        let callback = self
            .table
            .on_resource_completed
            .ok_or(Error::MissingCallback("on_resource_completed"))?;
        unsafe { callback(self.handle.as_ptr(), fd.raw()) };
        Ok(())
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
