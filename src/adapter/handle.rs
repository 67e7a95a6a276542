//! Scoped ownership of a host listener reference.

use std::ffi::c_void;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use rb_core::{Error, Result};

/// Host function that turns a caller-scoped listener reference into a
/// long-lived one.
pub type RetainFn = unsafe extern "C" fn(context: *mut c_void) -> *mut c_void;

/// Host function that gives back a reference obtained from [`RetainFn`].
pub type ReleaseFn = unsafe extern "C" fn(handle: *mut c_void);

/// A reference to a host listener that lives exactly as long as one bridge
/// call.
///
/// When the host supplies `retain`/`release`, the handle is retained on
/// acquisition and released exactly once on drop, so the listener stays valid
/// even if the caller's own reference goes out of scope mid-call. Without them
/// the context pointer is borrowed as is.
///
/// The handle is neither `Send` nor `Sync` and borrows the listener table for
/// `'call`, so it cannot escape the call that created it.
pub struct ListenerHandle<'call> {
    raw: NonNull<c_void>,
    release: Option<ReleaseFn>,
    _call: PhantomData<&'call c_void>,
}

impl<'call> ListenerHandle<'call> {
    /// Acquire a handle to the listener behind `context`.
    ///
    /// # Safety
    ///
    /// `retain` and `release`, when present, must be safe to call with
    /// `context` and with the handle `retain` returns.
    pub unsafe fn acquire(
        context: *mut c_void,
        retain: Option<RetainFn>,
        release: Option<ReleaseFn>,
    ) -> Result<Self> {
        let context = NonNull::new(context)
            .ok_or_else(|| Error::boundary("listener context is null"))?;

        let (raw, release) = match (retain, release) {
            (Some(retain), Some(release)) => {
                let retained = unsafe { retain(context.as_ptr()) };
                let raw = NonNull::new(retained)
                    .ok_or_else(|| Error::boundary("listener retain returned null"))?;
                (raw, Some(release))
            }
            (None, None) => (context, None),
            (Some(_), None) => return Err(Error::MissingCallback("release")),
            (None, Some(_)) => return Err(Error::MissingCallback("retain")),
        };

        tracing::trace!(handle = ?raw, retained = release.is_some(), "Listener handle acquired");
        Ok(Self {
            raw,
            release,
            _call: PhantomData,
        })
    }

    /// The pointer passed as the first argument of every host callback.
    pub fn as_ptr(&self) -> *mut c_void {
        self.raw.as_ptr()
    }

    /// Whether this handle holds a retained reference that will be released.
    pub fn is_retained(&self) -> bool {
        self.release.is_some()
    }
}

impl Drop for ListenerHandle<'_> {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            unsafe { release(self.raw.as_ptr()) };
            tracing::trace!(handle = ?self.raw, "Listener handle released");
        }
    }
}

impl fmt::Debug for ListenerHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("raw", &self.raw)
            .field("retained", &self.is_retained())
            .finish()
    }
}
