//! Shared test harness for integration tests.
//!
//! Provides [`FakeEngine`], a scripted stand-in for the native engine, and
//! [`Recorder`], a host listener exposed through the C listener tables that
//! counts every callback it receives.

#![allow(dead_code)]

use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use rawbridge::adapter::{RbConversionListener, RbImageListener};
use rb_core::{ConversionProgress, Error, ImageProgress, Metadata, Result};
use rb_engine::{Engine, PendingContainer, RawFrame, RunStatus, VideoOptions};

/// Frames in every container the fake engine reads from disk.
pub const FRAME_COUNT: u32 = 30;
/// Frame rate reported for every container the fake engine reads from disk.
pub const FRAME_RATE: f32 = 24.0;
/// Message the fake engine fails with for `broken*` inputs.
pub const CORRUPT_MESSAGE: &str = "corrupt container header";
/// Panic payload of the fake engine for `panicky*` inputs.
pub const PANIC_MESSAGE: &str = "decoder crashed";
/// Metadata string the recording host returns from `on_preview_saved`.
pub const PREVIEW_METADATA: &str = r#"{"iso":100}"#;

// ---------------------------------------------------------------------------
// Fake engine
// ---------------------------------------------------------------------------

/// Scripted engine.
///
/// Inputs whose file stem starts with `broken` (and containers whose metadata
/// carries `"fail": true`) fail after reporting the error to the listener.
/// File inputs starting with `panicky` panic after the first progress update.
/// Everything else reports progress at 0, 50 and 100 percent, checking for
/// cancellation each time.
#[derive(Debug, Default)]
pub struct FakeEngine {
    calls: Mutex<Vec<String>>,
    last_options: Mutex<Option<VideoOptions>>,
    previews: Mutex<Vec<String>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the engine operations invoked so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Options passed to the most recent `convert_video`.
    pub fn last_options(&self) -> Option<VideoOptions> {
        *self.last_options.lock()
    }

    /// Metadata strings returned by `on_preview_saved`, in order.
    pub fn previews(&self) -> Vec<String> {
        self.previews.lock().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().push(call.to_string());
    }

    fn stem_starts_with(input: &Path, prefix: &str) -> bool {
        input
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.starts_with(prefix))
    }

    fn is_broken(input: &Path) -> bool {
        Self::stem_starts_with(input, "broken")
    }

    fn develop(
        &self,
        failure: Option<&str>,
        output: &Path,
        listener: &mut dyn ImageProgress,
    ) -> Result<RunStatus> {
        if let Some(message) = failure {
            listener.on_error(message)?;
            return Err(Error::engine(message));
        }

        for percent in [0, 50, 100] {
            if !listener.on_progress_update(percent)? {
                return Ok(RunStatus::Cancelled);
            }
        }

        let preview = output.with_extension("jpg");
        let metadata = listener.on_preview_saved(&preview)?;
        self.previews.lock().push(metadata);

        listener.on_completed()?;
        Ok(RunStatus::Completed)
    }
}

impl Engine for FakeEngine {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn process_container(
        &self,
        container: PendingContainer,
        output: &Path,
        listener: &mut dyn ImageProgress,
    ) -> Result<RunStatus> {
        self.record("process_container");
        let fails = container.metadata["fail"].as_bool().unwrap_or(false);
        self.develop(fails.then_some(CORRUPT_MESSAGE), output, listener)
    }

    fn process_file(
        &self,
        input: &Path,
        output: &Path,
        listener: &mut dyn ImageProgress,
    ) -> Result<RunStatus> {
        self.record("process_file");
        if Self::stem_starts_with(input, "panicky") {
            listener.on_progress_update(0)?;
            panic!("{PANIC_MESSAGE}");
        }
        let failure = Self::is_broken(input).then_some(CORRUPT_MESSAGE);
        self.develop(failure, output, listener)
    }

    fn convert_video(
        &self,
        input: &Path,
        options: &VideoOptions,
        listener: &mut dyn ConversionProgress,
    ) -> Result<RunStatus> {
        self.record("convert_video");
        *self.last_options.lock() = Some(*options);

        if Self::is_broken(input) {
            listener.on_error(CORRUPT_MESSAGE)?;
            return Err(Error::engine(CORRUPT_MESSAGE));
        }

        let units = options.output_units(FRAME_COUNT);
        for unit in 0..units {
            let percent = (unit * 100 / units) as i32;
            if !listener.on_progress_update(percent)? {
                return Ok(RunStatus::Cancelled);
            }

            let frame_index = unit as i32;
            let fd = listener.on_need_fd(frame_index)?;
            if !fd.is_valid() {
                let err = Error::ResourceUnavailable { frame_index };
                listener.on_error(&err.to_string())?;
                return Err(err);
            }
            listener.on_resource_completed(fd)?;
        }

        if !listener.on_progress_update(100)? {
            return Ok(RunStatus::Cancelled);
        }
        listener.on_completed()?;
        Ok(RunStatus::Completed)
    }

    fn metadata(&self, input: &Path) -> Result<Metadata> {
        self.record("metadata");
        if Self::is_broken(input) {
            return Err(Error::engine(CORRUPT_MESSAGE));
        }
        Ok(Metadata::new(FRAME_RATE, FRAME_COUNT as i32))
    }
}

/// A small pending container with `frames` frames.
pub fn container(frames: usize, fail: bool) -> PendingContainer {
    let frames = (0..frames)
        .map(|i| RawFrame {
            timestamp_ns: i as i64 * 41_666_667,
            width: 4,
            height: 2,
            data: vec![0u8; 16],
        })
        .collect();
    PendingContainer::new(serde_json::json!({ "camera": "test", "fail": fail }), frames)
}

/// Create an (empty) input file named `name` inside `dir`.
pub fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"").unwrap();
    path
}

// ---------------------------------------------------------------------------
// Recording host listener
// ---------------------------------------------------------------------------

/// Host-side listener state reached through the C tables' context pointer.
#[derive(Debug)]
pub struct Recorder {
    pub retains: AtomicUsize,
    pub releases: AtomicUsize,
    pub completions: AtomicUsize,
    pub frees: AtomicUsize,
    pub progress: Mutex<Vec<i32>>,
    pub errors: Mutex<Vec<String>>,
    pub previews: Mutex<Vec<String>>,
    pub needed: Mutex<Vec<i32>>,
    pub finished: Mutex<Vec<i32>>,
    answer: u8,
    cancel_at: Option<i32>,
    refuse_fd_at: Option<i32>,
}

impl Default for Recorder {
    fn default() -> Self {
        Self {
            retains: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
            completions: AtomicUsize::new(0),
            frees: AtomicUsize::new(0),
            progress: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
            previews: Mutex::new(Vec::new()),
            needed: Mutex::new(Vec::new()),
            finished: Mutex::new(Vec::new()),
            answer: 1,
            cancel_at: None,
            refuse_fd_at: None,
        }
    }
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every progress update with the raw host boolean `answer`.
    pub fn answering(mut self, answer: u8) -> Self {
        self.answer = answer;
        self
    }

    /// Request cancellation when progress reaches `percent`.
    pub fn cancel_at(mut self, percent: i32) -> Self {
        self.cancel_at = Some(percent);
        self
    }

    /// Return an invalid descriptor when frame `index` is requested.
    pub fn refuse_fd_at(mut self, index: i32) -> Self {
        self.refuse_fd_at = Some(index);
        self
    }

    pub fn retains(&self) -> usize {
        self.retains.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }

    pub fn frees(&self) -> usize {
        self.frees.load(Ordering::SeqCst)
    }

    fn context(&self) -> *mut c_void {
        self as *const Recorder as *mut c_void
    }

    /// Image listener table with every callback and retain/release present.
    pub fn image_table(&self) -> RbImageListener {
        RbImageListener {
            context: self.context(),
            retain: Some(retain),
            release: Some(release),
            on_preview_saved: Some(on_preview_saved),
            free_string: Some(free_string),
            on_progress_update: Some(on_progress_update),
            on_completed: Some(on_completed),
            on_error: Some(on_error),
        }
    }

    /// Conversion listener table with every callback and retain/release
    /// present.
    pub fn conversion_table(&self) -> RbConversionListener {
        RbConversionListener {
            context: self.context(),
            retain: Some(retain),
            release: Some(release),
            on_need_fd: Some(on_need_fd),
            on_progress_update: Some(on_progress_update),
            on_resource_completed: Some(on_resource_completed),
            on_completed: Some(on_completed),
            on_error: Some(on_error),
        }
    }
}

/// Descriptor the recorder hands out for frame `index`.
pub fn fd_for(index: i32) -> i32 {
    100 + index
}

unsafe fn recorder<'a>(handle: *mut c_void) -> &'a Recorder {
    unsafe { &*(handle as *const Recorder) }
}

unsafe extern "C" fn retain(context: *mut c_void) -> *mut c_void {
    unsafe { recorder(context) }.retains.fetch_add(1, Ordering::SeqCst);
    context
}

unsafe extern "C" fn release(handle: *mut c_void) {
    unsafe { recorder(handle) }.releases.fetch_add(1, Ordering::SeqCst);
}

unsafe extern "C" fn on_preview_saved(handle: *mut c_void, path: *const c_char) -> *mut c_char {
    let rec = unsafe { recorder(handle) };
    let path = unsafe { CStr::from_ptr(path) }.to_string_lossy().into_owned();
    rec.previews.lock().push(path);
    CString::new(PREVIEW_METADATA).unwrap().into_raw()
}

unsafe extern "C" fn free_string(handle: *mut c_void, value: *mut c_char) {
    drop(unsafe { CString::from_raw(value) });
    unsafe { recorder(handle) }.frees.fetch_add(1, Ordering::SeqCst);
}

unsafe extern "C" fn on_progress_update(handle: *mut c_void, percent: c_int) -> u8 {
    let rec = unsafe { recorder(handle) };
    rec.progress.lock().push(percent);
    if rec.cancel_at == Some(percent) {
        0
    } else {
        rec.answer
    }
}

unsafe extern "C" fn on_completed(handle: *mut c_void) {
    unsafe { recorder(handle) }.completions.fetch_add(1, Ordering::SeqCst);
}

unsafe extern "C" fn on_error(handle: *mut c_void, message: *const c_char) {
    let rec = unsafe { recorder(handle) };
    let message = unsafe { CStr::from_ptr(message) }.to_string_lossy().into_owned();
    rec.errors.lock().push(message);
}

unsafe extern "C" fn on_need_fd(handle: *mut c_void, frame_index: c_int) -> c_int {
    let rec = unsafe { recorder(handle) };
    rec.needed.lock().push(frame_index);
    if rec.refuse_fd_at == Some(frame_index) {
        -1
    } else {
        fd_for(frame_index)
    }
}

unsafe extern "C" fn on_resource_completed(handle: *mut c_void, fd: c_int) {
    unsafe { recorder(handle) }.finished.lock().push(fd);
}
