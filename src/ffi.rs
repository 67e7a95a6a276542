//! Exported C ABI.
//!
//! The crate that links the native engine registers it once with [`install`];
//! the `rawbridge_*` functions below then drive it on behalf of foreign hosts.
//!
//! Return convention for the processing calls:
//!
//! | Value | Meaning |
//! |-------|---------|
//! | [`RB_COMPLETED`] (`1`) | the engine finished |
//! | [`RB_NOT_COMPLETED`] (`0`) | nothing was pending, or the listener cancelled |
//! | [`RB_FAILED`] (`-1`) | the call failed; read [`rawbridge_last_error`] |
//!
//! No Rust error value or panic ever crosses the boundary: both are recorded in
//! the last-error slot and reported as [`RB_FAILED`].

use std::any::Any;
use std::ffi::{c_char, c_int};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use rb_core::config::BridgeConfig;
use rb_core::{Error, Metadata, Result};
use rb_engine::Engine;

use crate::adapter::{value, HostConversionListener, HostImageListener};
use crate::adapter::{RbConversionListener, RbImageListener};
use crate::driver::{ConversionDriver, Outcome};
use crate::last_error;

pub const RB_COMPLETED: c_int = 1;
pub const RB_NOT_COMPLETED: c_int = 0;
pub const RB_FAILED: c_int = -1;

static DRIVER: OnceLock<ConversionDriver<dyn Engine>> = OnceLock::new();

/// Register the engine the exported functions drive.
///
/// Can be called once per process; later calls fail with
/// [`Error::InvalidArgument`] and leave the first engine in place.
pub fn install(engine: Arc<dyn Engine>, config: BridgeConfig) -> Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config: {warning}");
    }

    let name = engine.name();
    DRIVER
        .set(ConversionDriver::new(engine).with_config(config))
        .map_err(|_| Error::invalid_argument("an engine is already installed"))?;
    tracing::info!(engine = name, "Engine installed");
    Ok(())
}

/// The driver registered with [`install`], if any.
pub fn installed() -> Option<&'static ConversionDriver<dyn Engine>> {
    DRIVER.get()
}

fn driver() -> Result<&'static ConversionDriver<dyn Engine>> {
    installed().ok_or(Error::NotInstalled)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

/// Run `call`, translating its result into the boundary return convention.
fn guarded(op: &'static str, call: impl FnOnce() -> Result<Outcome>) -> c_int {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(Outcome::Completed)) => RB_COMPLETED,
        Ok(Ok(Outcome::Cancelled | Outcome::Declined)) => RB_NOT_COMPLETED,
        Ok(Err(e)) => {
            last_error::record(&e);
            RB_FAILED
        }
        Err(payload) => {
            let message = format!("{op} panicked: {}", panic_message(payload.as_ref()));
            tracing::error!("{message}");
            last_error::record_message(message);
            RB_FAILED
        }
    }
}

/// Develop the next pending in-memory container into `output_path`.
///
/// # Safety
///
/// `output_path` must be null or a NUL-terminated string. `listener` must be
/// null or point to an [`RbImageListener`] whose callbacks stay valid for the
/// duration of the call.
#[no_mangle]
pub unsafe extern "C" fn rawbridge_process_in_memory(
    output_path: *const c_char,
    listener: *const RbImageListener,
) -> c_int {
    guarded("process_in_memory", || {
        let driver = driver()?;
        let output = unsafe { value::path_from_host(output_path, "output path") }?;
        let table = unsafe { listener.as_ref() }
            .ok_or_else(|| Error::boundary("image listener is null"))?;
        let mut listener = unsafe { HostImageListener::attach(table) }?;
        driver.process_in_memory(&output, &mut listener)
    })
}

/// Develop the container at `input_path` into `output_path`.
///
/// # Safety
///
/// Same contract as [`rawbridge_process_in_memory`]; `input_path` must be null
/// or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn rawbridge_process_file(
    input_path: *const c_char,
    output_path: *const c_char,
    listener: *const RbImageListener,
) -> c_int {
    guarded("process_file", || {
        let driver = driver()?;
        let input = unsafe { value::path_from_host(input_path, "input path") }?;
        let output = unsafe { value::path_from_host(output_path, "output path") }?;
        let table = unsafe { listener.as_ref() }
            .ok_or_else(|| Error::boundary("image listener is null"))?;
        let mut listener = unsafe { HostImageListener::attach(table) }?;
        driver.process_file(&input, &output, &mut listener)
    })
}

/// Convert the video container at `input_path` into stills.
///
/// # Safety
///
/// `input_path` must be null or a NUL-terminated string. `listener` must be
/// null or point to an [`RbConversionListener`] whose callbacks stay valid for
/// the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn rawbridge_convert_video(
    input_path: *const c_char,
    frame_merge_count: c_int,
    listener: *const RbConversionListener,
) -> c_int {
    guarded("convert_video", || {
        let driver = driver()?;
        let input = unsafe { value::path_from_host(input_path, "input path") }?;
        let merge = u32::try_from(frame_merge_count).map_err(|_| {
            Error::invalid_argument(format!(
                "frame merge count must be at least 1, got {frame_merge_count}"
            ))
        })?;
        let table = unsafe { listener.as_ref() }
            .ok_or_else(|| Error::boundary("conversion listener is null"))?;
        let mut listener = unsafe { HostConversionListener::attach(table) }?;
        driver.convert_video(&input, merge, &mut listener)
    })
}

/// Read frame rate and frame count of the container at `input_path` into
/// `out`. Returns [`RB_COMPLETED`] or [`RB_FAILED`]; `out` is left untouched on
/// failure.
///
/// # Safety
///
/// `input_path` must be null or a NUL-terminated string; `out` must be null or
/// valid for writing one [`Metadata`].
#[no_mangle]
pub unsafe extern "C" fn rawbridge_get_metadata(
    input_path: *const c_char,
    out: *mut Metadata,
) -> c_int {
    guarded("get_metadata", || {
        let driver = driver()?;
        let input = unsafe { value::path_from_host(input_path, "input path") }?;
        if out.is_null() {
            return Err(Error::boundary("metadata out-parameter is null"));
        }
        let meta = driver.metadata(&input)?;
        unsafe { out.write(meta) };
        Ok(Outcome::Completed)
    })
}

/// Copy the most recent failure message into `buf` (NUL-terminated, truncated
/// to `len` bytes) and return its full length in bytes. Pass a null `buf` to
/// query the length only. Returns 0 when no call has failed yet.
///
/// # Safety
///
/// `buf` must be null or valid for writing `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn rawbridge_last_error(buf: *mut c_char, len: usize) -> usize {
    let buf: &mut [u8] = if buf.is_null() || len == 0 {
        &mut []
    } else {
        unsafe { std::slice::from_raw_parts_mut(buf.cast::<u8>(), len) }
    };
    last_error::copy_last_error(buf)
}
