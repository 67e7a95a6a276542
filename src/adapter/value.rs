//! Value translation between Rust and the host's C representation.

use std::ffi::{c_char, CStr, CString};
use std::path::{Path, PathBuf};

use rb_core::{Error, Result};

/// The host's single-byte `true` sentinel. Any other byte reads as `false`.
pub const HOST_TRUE: u8 = 1;

/// Read a host boolean. Only an exact [`HOST_TRUE`] is `true`.
pub fn host_bool(raw: u8) -> bool {
    raw == HOST_TRUE
}

/// Encode `value` as a NUL-terminated UTF-8 string for the host.
pub fn to_host_string(value: &str) -> Result<CString> {
    CString::new(value).map_err(|e| {
        Error::boundary(format!(
            "string contains an interior NUL at byte {}",
            e.nul_position()
        ))
    })
}

/// Encode a path for the host. Paths must be valid UTF-8.
pub fn path_to_host(path: &Path) -> Result<CString> {
    let text = path
        .to_str()
        .ok_or_else(|| Error::boundary(format!("path is not valid UTF-8: {}", path.display())))?;
    to_host_string(text)
}

/// Copy a NUL-terminated UTF-8 string owned by the host.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays valid for
/// the duration of this call.
pub unsafe fn from_host_str(ptr: *const c_char, what: &str) -> Result<String> {
    if ptr.is_null() {
        return Err(Error::boundary(format!("{what} is null")));
    }
    let text = unsafe { CStr::from_ptr(ptr) };
    text.to_str()
        .map(str::to_owned)
        .map_err(|e| Error::boundary(format!("{what} is not valid UTF-8: {e}")))
}

/// Copy a host path argument.
///
/// # Safety
///
/// Same contract as [`from_host_str`].
pub unsafe fn path_from_host(ptr: *const c_char, what: &str) -> Result<PathBuf> {
    let text = unsafe { from_host_str(ptr, what) }?;
    if text.is_empty() {
        return Err(Error::invalid_argument(format!("{what} is empty")));
    }
    Ok(PathBuf::from(text))
}
