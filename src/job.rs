//! Run orchestration: resolving inputs, driving lesson builds, and the
//! narrow contracts a presentation shell plugs into.
//!
//! The shell (GUI, CLI, anything else) supplies an input location, an output
//! root, a log sink, and a cancellation token, then calls [`run_job`]
//! (typically from a worker thread). Everything user-visible flows back
//! through the [`LogSink`]; the [`CompletionSignal`] fires exactly once per
//! run. Per-file and per-row failures never escape the run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use derive_builder::Builder;

use crate::lesson::builder::build_lesson;
use crate::SpeechSynthesizer;

/// Default source-file extension for directory discovery.
pub const SOURCE_EXTENSION: &str = "xlsx";

/// Line-oriented log sink the pipeline reports through.
///
/// Implementations must tolerate being called from a worker thread distinct
/// from the one that started the run.
pub trait LogSink: Send + Sync {
    fn line(&self, message: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn line(&self, message: &str) {
        self(message)
    }
}

/// One-shot completion notification, invoked once per run after every
/// resolved input has been attempted, failures included.
pub trait CompletionSignal {
    fn done(&self);
}

impl<F> CompletionSignal for F
where
    F: Fn(),
{
    fn done(&self) {
        self()
    }
}

/// Cooperative cancellation flag.
///
/// Checked between files only; a file whose build has started always runs
/// to completion. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Options for one conversion run.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct JobOptions {
    /// Input spreadsheet, or a directory when `process_directory` is set.
    pub input: PathBuf,
    /// Folder the lesson, mapping, and audio artifacts land under.
    pub output_root: PathBuf,
    /// Language code passed to the synthesis engine.
    #[builder(default = "\"ja\".to_string()")]
    pub lang: String,
    /// Process every matching file in `input` instead of a single file.
    #[builder(default)]
    pub process_directory: bool,
    /// Extension used for directory discovery, matched case-insensitively.
    #[builder(default = "SOURCE_EXTENSION.to_string()")]
    pub extension: String,
}

/// Boundary precondition failures, reported to the initiating caller before
/// any processing begins. Everything that can go wrong *during* a run is
/// logged and scoped instead.
#[derive(thiserror::Error, Debug)]
pub enum JobError {
    #[error("no input file or directory given")]
    MissingInput,
    #[error("no output folder given")]
    MissingOutput,
    #[error("failed to create output folder {}: {source}", .path.display())]
    OutputRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to list directory {}: {source}", .path.display())]
    ListDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobSummary {
    pub files_attempted: usize,
    pub files_completed: usize,
    pub cancelled: bool,
}

/// Non-recursive scan of `dir` for files carrying `extension` (any case),
/// in directory-listing order.
pub fn discover_inputs(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, JobError> {
    let entries = fs::read_dir(dir).map_err(|source| JobError::ListDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut inputs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| JobError::ListDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .map_or(false, |ext| ext.to_string_lossy().eq_ignore_ascii_case(extension));
        if matches {
            inputs.push(path);
        }
    }
    Ok(inputs)
}

/// Run one conversion job: a single spreadsheet, or every matching
/// spreadsheet in a directory.
///
/// Files are processed one at a time, in discovery order; rows within a
/// file run to completion once the file is started. Per-file and per-row
/// failures are logged through `log` and never abort the run. `done` fires
/// once after every resolved input has been attempted. Only precondition
/// failures (empty paths, an uncreatable output root, an unlistable input
/// directory) are returned as errors, before any processing starts.
pub fn run_job<S>(
    options: &JobOptions,
    synth: &mut S,
    log: &dyn LogSink,
    cancel: &CancelToken,
    done: &dyn CompletionSignal,
) -> Result<JobSummary, JobError>
where
    S: SpeechSynthesizer + ?Sized,
{
    validate(options)?;
    fs::create_dir_all(&options.output_root).map_err(|source| JobError::OutputRoot {
        path: options.output_root.clone(),
        source,
    })?;

    let inputs: Vec<PathBuf> = if options.process_directory && options.input.is_dir() {
        let found = discover_inputs(&options.input, &options.extension)?;
        if found.is_empty() {
            log.line(&format!(
                "No .{} files in {}",
                options.extension,
                options.input.display()
            ));
        }
        found
    } else if options.input.exists() {
        vec![options.input.clone()]
    } else {
        log.line(&format!("Input not found: {}", options.input.display()));
        Vec::new()
    };

    let mut summary = JobSummary::default();
    for input in &inputs {
        if cancel.is_cancelled() {
            summary.cancelled = true;
            log::info!(
                "run cancelled after {} of {} files",
                summary.files_attempted,
                inputs.len()
            );
            break;
        }

        summary.files_attempted += 1;
        log.line(&format!("Processing: {}", input.display()));
        match build_lesson(input, &options.output_root, &options.lang, synth, log) {
            Ok(report) => {
                summary.files_completed += 1;
                log::debug!(
                    "built '{}': {} rows, {} clips, {} failed",
                    report.lesson_name,
                    report.rows,
                    report.clips,
                    report.failed_rows.len()
                );
            }
            Err(err) => {
                log.line(&format!("Error building lesson from {}: {err}", input.display()));
            }
        }
    }

    log.line("All done.");
    done.done();
    Ok(summary)
}

fn validate(options: &JobOptions) -> Result<(), JobError> {
    if options.input.as_os_str().is_empty() {
        return Err(JobError::MissingInput);
    }
    if options.output_root.as_os_str().is_empty() {
        return Err(JobError::MissingOutput);
    }
    Ok(())
}
