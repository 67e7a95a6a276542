//! Process-wide last-error slot for hosts calling through the C ABI.
//!
//! Rust callers get failures in the `Result` of their own call; this slot only
//! exists because a C caller sees a bare `-1` and needs a second call to fetch
//! the text.
//!
//! The slot is shared by every thread. It is overwritten by each failure and is
//! never cleared by a successful call, so after a success it may still hold the
//! text of an earlier, unrelated failure. Two threads failing at the same time
//! race for the slot and one message wins.

use parking_lot::Mutex;

use rb_core::Error;

static LAST_ERROR: Mutex<Option<String>> = Mutex::new(None);

/// Record `error` as the most recent failure.
pub fn record(error: &Error) {
    record_message(error.to_string());
}

/// Record a raw failure message.
pub fn record_message(message: impl Into<String>) {
    let message = message.into();
    tracing::debug!(%message, "Recording last error");
    *LAST_ERROR.lock() = Some(message);
}

/// Text of the most recent failure, if any call has failed.
pub fn last_error() -> Option<String> {
    LAST_ERROR.lock().clone()
}

/// Forget the recorded failure.
pub fn clear_last_error() {
    *LAST_ERROR.lock() = None;
}

/// Copy the last error into `buf` as a NUL-terminated string, truncating if
/// needed, and return the full message length in bytes (excluding the NUL).
///
/// Truncation happens on a character boundary, so the copied prefix is always
/// valid UTF-8. An empty `buf` receives nothing; the return value still
/// reports the length so callers can size a buffer.
pub fn copy_last_error(buf: &mut [u8]) -> usize {
    let slot = LAST_ERROR.lock();
    let message = slot.as_deref().unwrap_or("");

    if let Some(room) = buf.len().checked_sub(1) {
        // Never split a UTF-8 sequence.
        let mut n = message.len().min(room);
        while !message.is_char_boundary(n) {
            n -= 1;
        }
        buf[..n].copy_from_slice(&message.as_bytes()[..n]);
        buf[n] = 0;
    }
    message.len()
}
