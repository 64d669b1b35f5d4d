//! Core types for the conversion pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::RunOptions;
use crate::logging::JobLog;
use crate::models::{ConversionJob, RemuxPlan, TrackCatalog, TrackDescriptor};
use crate::tools::{ExecMode, ToolRunner};

/// Read-only context passed to pipeline steps.
///
/// Holds the input container and shared resources that steps can read
/// but not modify. Mutable state goes in `JobState`.
pub struct Context {
    /// The input container being converted.
    pub input: PathBuf,
    /// Container title (filename without the final extension).
    pub title: String,
    /// Validated run options.
    pub opts: RunOptions,
    /// Per-file transcript log.
    pub log: Arc<JobLog>,
    /// Gated executor for external tools.
    pub runner: ToolRunner,
}

impl Context {
    /// Create a context for one input container.
    pub fn new(
        input: PathBuf,
        title: impl Into<String>,
        opts: RunOptions,
        log: Arc<JobLog>,
        runner: ToolRunner,
    ) -> Self {
        Self {
            input,
            title: title.into(),
            opts,
            log,
            runner,
        }
    }

    /// Whether state-changing commands actually execute this run.
    ///
    /// Steps use this to decide if produced files exist: in dry-run mode
    /// nothing was written, so reads and registrations are pointless.
    pub fn executing(&self) -> bool {
        self.runner.mode() != ExecMode::DryRun
    }

    /// Directory the input container lives in.
    pub fn input_dir(&self) -> &Path {
        self.input.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Mutable per-file state that accumulates results from pipeline steps.
///
/// Each step records its output in its own slot; later steps read the
/// slots of earlier ones. `temp_files` tracks which working files exist
/// right now, so the driver can clean up after both success and failure.
#[derive(Debug, Default)]
pub struct JobState {
    /// Track catalog (from the Inspect step).
    pub catalog: Option<TrackCatalog>,
    /// Tracks chosen for conversion (from the Select step).
    pub selection: Option<Vec<TrackDescriptor>>,
    /// Conversion jobs with their working files (from the Extract step,
    /// completed by the Convert step).
    pub jobs: Option<Vec<ConversionJob>>,
    /// The remux plan (from the Remux step).
    pub plan: Option<RemuxPlan>,
    /// Delivery results (from the Remux step).
    pub delivery: Option<DeliveryOutput>,
    /// Working files that still exist and belong to this run.
    pub temp_files: TempSet,
}

impl JobState {
    /// Create an empty job state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if inspection has recorded a catalog.
    pub fn has_catalog(&self) -> bool {
        self.catalog.is_some()
    }

    /// Check if selection has been made.
    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    /// Check if conversion jobs exist.
    pub fn has_jobs(&self) -> bool {
        self.jobs.is_some()
    }

    /// Check if delivery results were recorded.
    pub fn has_delivery(&self) -> bool {
        self.delivery.is_some()
    }
}

/// Output from the Remux step.
#[derive(Debug, Clone)]
pub struct DeliveryOutput {
    /// The delivered container, when the run produced one.
    pub container: Option<PathBuf>,
    /// Standalone AC-3 files delivered next to the input.
    pub external_files: Vec<PathBuf>,
    /// Remux tool exit code (`None` when no remux ran).
    pub exit_code: Option<i32>,
}

/// Working files created by this run, in creation order.
///
/// Files are registered the moment they come into existence (never during
/// a dry run) and forgotten when handed over as a deliverable. Whatever is
/// still tracked at the end of the file gets deleted, on the success and
/// the failure path alike.
#[derive(Debug, Default)]
pub struct TempSet {
    paths: Vec<PathBuf>,
}

impl TempSet {
    /// Track a working file. Registering the same path twice is harmless.
    pub fn register(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    /// Stop tracking a file that is now a delivered output (or was
    /// explicitly retained by configuration).
    pub fn forget(&mut self, path: &Path) {
        self.paths.retain(|p| p != path);
    }

    /// Number of files currently tracked.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Delete every tracked file.
    ///
    /// A missing file is fine (something downstream may have consumed it);
    /// any other failure is logged and skipped so cleanup never aborts.
    pub fn cleanup(&mut self, log: &JobLog) {
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => log.debug(&format!("removed {}", path.display())),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => log.warn(&format!("could not remove {}: {}", path.display(), e)),
            }
        }
    }
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// The file needs no further work (not an error). The remaining steps
    /// do not run; the reason is reported to the operator.
    Skipped(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogConfig;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn job_state_tracks_completion() {
        let mut state = JobState::new();
        assert!(!state.has_catalog());
        assert!(!state.has_delivery());

        state.catalog = Some(TrackCatalog::new());
        assert!(state.has_catalog());
    }

    #[test]
    fn temp_set_deduplicates_and_forgets() {
        let mut temps = TempSet::default();
        temps.register("/tmp/movie.2.tc");
        temps.register("/tmp/movie.2.tc");
        temps.register("/tmp/movie.2.dts");
        assert_eq!(temps.len(), 2);

        temps.forget(Path::new("/tmp/movie.2.dts"));
        assert_eq!(temps.len(), 1);
    }

    #[test]
    fn cleanup_removes_tracked_files() {
        let dir = tempdir().unwrap();
        let kept = dir.path().join("kept.dts");
        let doomed = dir.path().join("doomed.tc");
        fs::write(&kept, b"x").unwrap();
        fs::write(&doomed, b"x").unwrap();

        let mut temps = TempSet::default();
        temps.register(&kept);
        temps.register(&doomed);
        temps.forget(&kept);

        let log = JobLog::detached("cleanup-test", LogConfig::default());
        temps.cleanup(&log);

        assert!(kept.exists());
        assert!(!doomed.exists());
        assert!(temps.is_empty());
    }

    #[test]
    fn cleanup_tolerates_already_missing_files() {
        let dir = tempdir().unwrap();
        let mut temps = TempSet::default();
        temps.register(dir.path().join("never-created.ac3"));

        let log = JobLog::detached("cleanup-test", LogConfig::default());
        temps.cleanup(&log);
        assert!(temps.is_empty());
    }
}
