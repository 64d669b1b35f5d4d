//! Batch driver - one pipeline run per input file.
//!
//! Files are processed strictly in order, each one fully (probe through
//! delivery) before the next begins. A failure is confined to its file;
//! the batch always continues.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::RunOptions;
use crate::convert::container_title;
use crate::logging::{JobLog, LogConfig};
use crate::models::{BatchSummary, FileReport, FileStatus};
use crate::tools::ToolRunner;

use super::create_standard_pipeline;
use super::types::{Context, JobState};

/// Run the conversion pipeline over a batch of input files.
///
/// Returns one report per input, in input order.
pub fn run_batch(inputs: &[PathBuf], opts: &RunOptions) -> BatchSummary {
    let mut summary = BatchSummary::new();

    for input in inputs {
        tracing::info!("processing {}", input.display());
        let report = process_file(input.clone(), opts.clone());
        match report.status {
            FileStatus::Converted => tracing::info!(
                "{}: converted {} track(s)",
                report.input.display(),
                report.tracks_converted
            ),
            FileStatus::Skipped => tracing::warn!(
                "{}: skipped ({})",
                report.input.display(),
                report.detail.as_deref().unwrap_or("no reason recorded")
            ),
            FileStatus::Failed => tracing::error!(
                "{}: {}",
                report.input.display(),
                report.detail.as_deref().unwrap_or("unknown failure")
            ),
        }
        summary.push(report);
    }

    summary
}

/// Convert one container, cleaning up working files on every path out.
pub fn process_file(input: PathBuf, opts: RunOptions) -> FileReport {
    let Some(title) = container_title(&input) else {
        return FileReport::failed(input, "input has no usable filename");
    };

    let log_config = match &opts.job_log_dir {
        Some(dir) => LogConfig::with_dir(dir),
        None => LogConfig::default(),
    };
    let log = match JobLog::new(&title, log_config) {
        Ok(log) => Arc::new(log),
        Err(e) => return FileReport::failed(input, format!("could not open job log: {}", e)),
    };

    if let Err(e) = fs::create_dir_all(&opts.working_dir) {
        return FileReport::failed(
            input,
            format!(
                "could not create working directory {}: {}",
                opts.working_dir.display(),
                e
            ),
        );
    }

    let runner = ToolRunner::new(opts.exec_mode(), opts.tool_timeout, Arc::clone(&log));
    let ctx = Context::new(input.clone(), title, opts, Arc::clone(&log), runner);
    let mut state = JobState::new();

    let pipeline = create_standard_pipeline();
    let result = pipeline.run(&ctx, &mut state);

    // Working files go away on success and failure alike; only files
    // explicitly forgotten (deliverables, retained DTS) survive.
    state.temp_files.cleanup(&log);
    log.close();

    match result {
        Ok(run) => {
            if let Some(reason) = run.skipped {
                FileReport::skipped(input, reason)
            } else {
                let output = state.delivery.as_ref().and_then(|d| d.container.clone());
                let tracks = state.jobs.as_ref().map(|j| j.len()).unwrap_or(0);
                FileReport::converted(input, output, tracks)
            }
        }
        Err(e) => FileReport::failed(input, e.to_string()),
    }
}
