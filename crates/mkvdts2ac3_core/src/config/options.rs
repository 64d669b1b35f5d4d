//! Per-run options.
//!
//! [`RunOptions`] is built once by the binary from CLI flags merged with the
//! persisted [`Settings`](super::Settings), validated up front, and then read
//! everywhere else. Nothing mutates it after construction.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use super::settings::ToolSettings;
use crate::models::{OutputMode, SelectionPolicy};
use crate::tools::ExecMode;

/// Pre-flight option validation failure. Aborts the run before any file is
/// touched.
#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("conflicting options: {first} cannot be combined with {second}")]
    ConflictingOptions {
        first: &'static str,
        second: &'static str,
    },
}

impl OptionsError {
    fn conflict(first: &'static str, second: &'static str) -> Self {
        Self::ConflictingOptions { first, second }
    }
}

/// Everything a single run needs to know. Immutable once built.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Convert every DTS track, not just the first.
    pub select_all: bool,
    /// Convert exactly this track id (overrides `select_all`).
    pub track_id: Option<u64>,
    /// Name for the new AC-3 track (single-track conversions only).
    pub custom_title: Option<String>,
    /// Flag the first new AC-3 track as the default audio track.
    pub mark_default: bool,
    /// Deliver standalone AC-3 files next to the original; no remux.
    pub keep_external: bool,
    /// Process files that already contain an AC-3 track.
    pub force: bool,
    /// Place new AC-3 tracks before the originally-retained tracks.
    pub initial_order: bool,
    /// Retain the extracted DTS payload file (implies dropping the DTS track).
    pub keep_dts: bool,
    /// Drop converted DTS tracks from the remuxed container.
    pub no_dts: bool,
    /// Write `<title>.new.mkv` next to the original instead of replacing it.
    pub adjacent_file: bool,
    /// Process niceness applied at startup; children inherit.
    pub niceness: i32,
    /// Directory for intermediate track files.
    pub working_dir: PathBuf,
    /// Extra `key=value` arguments for the decoder.
    pub custom_decode_args: Vec<String>,
    /// Extra `key=value` arguments for the encoder.
    pub custom_encode_args: Vec<String>,
    /// Log every external command without executing anything.
    pub dry_run: bool,
    /// Pause for operator acknowledgment before each external command.
    pub step_confirm: bool,
    /// ANSI color on the terminal.
    pub color: bool,
    /// Suppress all terminal output.
    pub quiet: bool,
    /// Show debug-level messages.
    pub verbose: bool,
    /// Resolved external tool locations.
    pub tools: ToolSettings,
    /// Per-invocation timeout; `None` disables it.
    pub tool_timeout: Option<Duration>,
    /// Directory for per-file transcript logs; `None` disables them.
    pub job_log_dir: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            select_all: false,
            track_id: None,
            custom_title: None,
            mark_default: false,
            keep_external: false,
            force: false,
            initial_order: false,
            keep_dts: false,
            no_dts: false,
            adjacent_file: false,
            niceness: 0,
            working_dir: PathBuf::from("/tmp"),
            custom_decode_args: Vec::new(),
            custom_encode_args: Vec::new(),
            dry_run: false,
            step_confirm: false,
            color: true,
            quiet: false,
            verbose: false,
            tools: ToolSettings::default(),
            tool_timeout: None,
            job_log_dir: None,
        }
    }
}

impl RunOptions {
    /// Whether converted DTS tracks are dropped from the remux.
    ///
    /// `keep_dts` implies dropping: retaining the payload file only makes
    /// sense when the track itself leaves the container.
    pub fn removes_dts(&self) -> bool {
        self.no_dts || self.keep_dts
    }

    /// The track selection policy this run uses.
    pub fn policy(&self) -> SelectionPolicy {
        match self.track_id {
            Some(id) => SelectionPolicy::Explicit(id),
            None if self.select_all => SelectionPolicy::AllDts,
            None => SelectionPolicy::FirstDts,
        }
    }

    /// How external commands are dispatched this run.
    pub fn exec_mode(&self) -> ExecMode {
        if self.dry_run {
            ExecMode::DryRun
        } else if self.step_confirm {
            ExecMode::StepConfirm
        } else {
            ExecMode::Execute
        }
    }

    /// Where the finished conversion ends up.
    pub fn output_mode(&self) -> OutputMode {
        if self.keep_external {
            OutputMode::ExternalOnly
        } else if self.adjacent_file {
            OutputMode::AdjacentNewFile
        } else {
            OutputMode::InPlaceReplace
        }
    }

    /// Validate option combinations before any file is processed.
    ///
    /// Returns warnings for combinations where one flag silently overrides
    /// another; returns an error for combinations that cannot be reconciled.
    pub fn validate(&self) -> Result<Vec<String>, OptionsError> {
        if self.quiet && self.verbose {
            return Err(OptionsError::conflict("--quiet", "--verbose"));
        }
        if self.dry_run && self.step_confirm {
            return Err(OptionsError::conflict("--test", "--debug"));
        }
        if self.removes_dts() && self.keep_external {
            let flag = if self.no_dts { "--no-dts" } else { "--keep" };
            return Err(OptionsError::conflict(flag, "--external"));
        }

        let mut warnings = Vec::new();
        if self.track_id.is_some() && self.select_all {
            warnings.push("--track overrides --all; converting only the named track".to_string());
        }
        if self.keep_external && self.mark_default {
            warnings.push("--default has no effect with --external".to_string());
        }
        if self.keep_external && self.custom_title.is_some() {
            warnings.push("--custom has no effect with --external".to_string());
        }
        Ok(warnings)
    }
}
