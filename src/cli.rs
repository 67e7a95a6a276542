//! Shared runner for the standalone converter tools.
//!
//! Both tools take `<input-file> <output-directory>`. The crate that links the
//! native engine provides the binaries; each `main` is a single call:
//!
//! ```no_run
//! # use std::sync::Arc;
//! # fn engine() -> Arc<dyn rb_engine::Engine> { unimplemented!() }
//! fn main() -> std::process::ExitCode {
//!     rawbridge::cli::run(rawbridge::cli::Tool::ConvertVideo, engine(), std::env::args_os())
//! }
//! ```

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches, Parser};

use rb_core::config::BridgeConfig;
use rb_core::{ConversionProgress, ImageProgress, ResourceHandle};
use rb_engine::Engine;

use crate::driver::{ConversionDriver, Outcome};
use crate::logging;

/// Which driver entry point a tool invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Convert a video container into DNG stills.
    ConvertVideo,
    /// Develop a container into a single DNG.
    ProcessImage,
}

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Tool::ConvertVideo => "rawbridge-convert",
            Tool::ProcessImage => "rawbridge-process",
        }
    }

    fn about(self) -> &'static str {
        match self {
            Tool::ConvertVideo => "Convert a raw video container into DNG stills",
            Tool::ProcessImage => "Develop a raw container into a single DNG",
        }
    }
}

/// Command-line arguments shared by both tools.
#[derive(Debug, Parser)]
pub struct ToolArgs {
    /// Container file to read
    pub input: PathBuf,

    /// Directory the output is written to
    pub output_dir: PathBuf,

    /// Consecutive frames merged into each still (video conversion only)
    #[arg(long, default_value_t = 1)]
    pub merge_frames: u32,

    /// Path to a JSON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run `tool` against `engine` with the given process arguments (including
/// the program name).
pub fn run<E, I, T>(tool: Tool, engine: Arc<E>, args: I) -> ExitCode
where
    E: Engine + ?Sized,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    ExitCode::from(run_status(tool, engine, args))
}

/// Same as [`run`], returning the raw exit status.
///
/// `0` on success (including a cancelled or declined run), `1` on an argument
/// error or a failed conversion.
pub fn run_status<E, I, T>(tool: Tool, engine: Arc<E>, args: I) -> u8
where
    E: Engine + ?Sized,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    run_with_output(tool, engine, args, &mut io::stderr())
}

/// Same as [`run_status`], writing diagnostics (argument errors, failure
/// messages, usage and the final summary) to `out` instead of stderr.
///
/// `--help` still goes to stdout. Progress lines are always printed to stderr.
pub fn run_with_output<E, I, T, W>(tool: Tool, engine: Arc<E>, args: I, out: &mut W) -> u8
where
    E: Engine + ?Sized,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write + ?Sized,
{
    let mut command = ToolArgs::command().name(tool.name()).about(tool.about());

    let parsed = command
        .try_get_matches_from_mut(args)
        .and_then(|matches| ToolArgs::from_arg_matches(&matches));
    let args = match parsed {
        Ok(args) => args,
        Err(e) if e.kind() == ErrorKind::DisplayHelp => {
            let _ = e.print();
            return 0;
        }
        Err(e) => {
            let _ = write!(out, "{}", e.render());
            return 1;
        }
    };

    let config = BridgeConfig::load_or_default(args.config.as_deref());
    logging::init(&config.logging, args.verbose);

    match execute(tool, engine, &args, config) {
        Ok(report) => {
            tracing::info!(outcome = ?report.outcome, tool = tool.name(), "Tool finished");
            let _ = writeln!(out, "{}", report.summary);
            0
        }
        Err(e) => {
            let _ = writeln!(out, "Error: {e:#}");
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", command.render_usage());
            1
        }
    }
}

/// How a successful tool run ended, with a line for the user.
struct Report {
    outcome: Outcome,
    summary: String,
}

fn execute<E: Engine + ?Sized>(
    tool: Tool,
    engine: Arc<E>,
    args: &ToolArgs,
    config: BridgeConfig,
) -> anyhow::Result<Report> {
    let output_dir = trim_trailing_separator(&args.output_dir);
    if !output_dir.is_dir() {
        bail!("output directory does not exist: {}", output_dir.display());
    }

    let stem = args
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string();
    let driver = ConversionDriver::new(engine).with_config(config);
    let mut listener = ConsoleListener::new(&output_dir, &stem);
    let image_output = output_dir.join(format!("{stem}.dng"));

    let outcome = match tool {
        Tool::ConvertVideo => driver.convert_video(&args.input, args.merge_frames, &mut listener),
        Tool::ProcessImage => driver.process_file(&args.input, &image_output, &mut listener),
    }
    .with_context(|| format!("failed to convert {}", args.input.display()))?;

    let summary = match (outcome, tool) {
        (Outcome::Completed, Tool::ConvertVideo) => format!(
            "Wrote {} file(s) to {}",
            listener.written().len(),
            output_dir.display()
        ),
        (Outcome::Completed, Tool::ProcessImage) => format!("Wrote {}", image_output.display()),
        (Outcome::Cancelled, _) => "Cancelled".to_string(),
        (Outcome::Declined, _) => "Nothing to do".to_string(),
    };
    Ok(Report { outcome, summary })
}

/// Remove one trailing path separator, keeping a bare root intact.
pub fn trim_trailing_separator(path: &Path) -> PathBuf {
    let Some(text) = path.to_str() else {
        return path.to_path_buf();
    };
    match text.strip_suffix(std::path::is_separator) {
        Some(trimmed) if !trimmed.is_empty() => PathBuf::from(trimmed),
        _ => path.to_path_buf(),
    }
}

/// Listener used by the tools: prints progress to stderr and hands out one
/// output file per requested frame.
///
/// The listener keeps ownership of every file it opens. The engine writes
/// through the raw descriptor and must not close it; the file is closed when
/// the engine reports the resource completed.
#[derive(Debug)]
pub struct ConsoleListener {
    output_dir: PathBuf,
    stem: String,
    open: HashMap<i32, (PathBuf, File)>,
    written: Vec<PathBuf>,
    issued: usize,
}

impl ConsoleListener {
    pub fn new(output_dir: &Path, stem: &str) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            stem: stem.to_string(),
            open: HashMap::new(),
            written: Vec::new(),
            issued: 0,
        }
    }

    /// Path used for output unit `frame_index`.
    pub fn frame_path(&self, frame_index: i32) -> PathBuf {
        self.output_dir
            .join(format!("{}-{:06}.dng", self.stem, frame_index))
    }

    /// Files the engine finished writing, in completion order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn print_progress(percent: i32) {
        eprint!("\rProgress: {percent:3}%");
    }
}

#[cfg(unix)]
fn resource_token(file: &File, _issued: usize) -> i32 {
    use std::os::fd::AsRawFd;
    file.as_raw_fd()
}

#[cfg(not(unix))]
fn resource_token(_file: &File, issued: usize) -> i32 {
    i32::try_from(issued).unwrap_or(i32::MAX)
}

impl ImageProgress for ConsoleListener {
    fn on_preview_saved(&mut self, path: &Path) -> rb_core::Result<String> {
        tracing::debug!(preview = %path.display(), "Preview saved");
        Ok(serde_json::json!({ "preview": path.display().to_string() }).to_string())
    }

    fn on_progress_update(&mut self, percent: i32) -> rb_core::Result<bool> {
        Self::print_progress(percent);
        Ok(true)
    }

    fn on_completed(&mut self) -> rb_core::Result<()> {
        eprintln!();
        Ok(())
    }

    fn on_error(&mut self, message: &str) -> rb_core::Result<()> {
        eprintln!();
        eprintln!("Engine error: {message}");
        Ok(())
    }
}

impl ConversionProgress for ConsoleListener {
    fn on_need_fd(&mut self, frame_index: i32) -> rb_core::Result<ResourceHandle> {
        let path = self.frame_path(frame_index);
        match File::create(&path) {
            Ok(file) => {
                self.issued += 1;
                let token = resource_token(&file, self.issued);
                self.open.insert(token, (path, file));
                Ok(ResourceHandle::new(token))
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot create output file");
                Ok(ResourceHandle::INVALID)
            }
        }
    }

    fn on_progress_update(&mut self, percent: i32) -> rb_core::Result<bool> {
        Self::print_progress(percent);
        Ok(true)
    }

    fn on_resource_completed(&mut self, handle: ResourceHandle) -> rb_core::Result<()> {
        match self.open.remove(&handle.raw()) {
            Some((path, file)) => {
                drop(file);
                self.written.push(path);
            }
            None => tracing::warn!(%handle, "Completion for a resource that is not open"),
        }
        Ok(())
    }

    fn on_completed(&mut self) -> rb_core::Result<()> {
        eprintln!();
        Ok(())
    }

    fn on_error(&mut self, message: &str) -> rb_core::Result<()> {
        eprintln!();
        eprintln!("Engine error: {message}");
        Ok(())
    }
}
