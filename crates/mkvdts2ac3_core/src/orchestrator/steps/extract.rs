//! Extract step - pulls timecodes and DTS payloads out of the container.
//!
//! Two batched mkvextract passes: timecodes first (the recovered delay
//! belongs to the job before the heavy payload extraction starts), then
//! the raw DTS payloads.

use std::path::Path;

use crate::convert::build_jobs;
use crate::extraction::{extract_payloads, extract_timecodes, read_delay_millis};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

/// Extract step for pulling track data into the working directory.
pub struct ExtractStep;

impl ExtractStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExtractStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ExtractStep {
    fn name(&self) -> &str {
        "Extract"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let selection = state
            .selection
            .as_deref()
            .ok_or_else(|| StepError::invalid_input("no selected tracks; selection must run first"))?;

        let mut jobs = build_jobs(&ctx.opts.working_dir, &ctx.title, selection, ctx.opts.keep_dts);

        ctx.log.info("extracting timecodes...");
        {
            let specs: Vec<(u64, &Path)> = jobs
                .iter()
                .map(|j| (j.track_id(), j.tc_path.as_path()))
                .collect();
            extract_timecodes(&ctx.runner, &ctx.opts.tools.mkvextract, &ctx.input, &specs)?;
        }
        if ctx.executing() {
            for job in &jobs {
                state.temp_files.register(&job.tc_path);
            }
        }

        for job in &mut jobs {
            // A dry run never wrote the timecode file; the delay defaults
            // to zero instead of attempting a read.
            job.delay_ms = if ctx.executing() {
                read_delay_millis(&job.tc_path)?
            } else {
                0
            };
            if job.delay_ms > 0 {
                ctx.log
                    .info(&format!("track {}: delay {}ms", job.track_id(), job.delay_ms));
            }
        }

        ctx.log.info("extracting DTS payloads...");
        {
            let specs: Vec<(u64, &Path)> = jobs
                .iter()
                .map(|j| (j.track_id(), j.dts_path.as_path()))
                .collect();
            extract_payloads(&ctx.runner, &ctx.opts.tools.mkvextract, &ctx.input, &specs)?;
        }
        if ctx.executing() {
            for job in &jobs {
                state.temp_files.register(&job.dts_path);
            }
        }

        state.jobs = Some(jobs);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        match &state.jobs {
            Some(jobs) if !jobs.is_empty() => Ok(()),
            _ => Err(StepError::invalid_output("no conversion jobs recorded")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunOptions;
    use crate::extraction::ExtractionError;
    use crate::logging::{JobLog, LogConfig};
    use crate::models::{TrackDescriptor, TrackType, DTS_CODEC};
    use crate::tools::ToolRunner;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn context_for(working_dir: PathBuf, mut opts: RunOptions) -> Context {
        opts.working_dir = working_dir;
        let log = Arc::new(JobLog::detached("extract-test", LogConfig::default()));
        let runner = ToolRunner::new(opts.exec_mode(), None, Arc::clone(&log));
        Context::new(PathBuf::from("/tmp/movie.mkv"), "movie", opts, log, runner)
    }

    fn state_with_selection() -> JobState {
        let mut state = JobState::new();
        state.selection = Some(vec![TrackDescriptor::new(2, TrackType::Audio, DTS_CODEC)]);
        state
    }

    #[test]
    fn delay_is_read_back_from_the_timecode_file() {
        let dir = tempdir().unwrap();
        // `true` swallows the mkvextract arguments; the timecode file the
        // real tool would have written is pre-seeded.
        fs::write(
            dir.path().join("movie.2.tc"),
            "# timecode format v2\n520.0\n",
        )
        .unwrap();

        let mut opts = RunOptions::default();
        opts.tools.mkvextract = "true".to_string();
        let ctx = context_for(dir.path().to_path_buf(), opts);
        let mut state = state_with_selection();

        let outcome = ExtractStep::new().execute(&ctx, &mut state).unwrap();
        assert_eq!(outcome, StepOutcome::Success);

        let jobs = state.jobs.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].delay_ms, 520);
        // Both working files are tracked for cleanup.
        assert_eq!(state.temp_files.len(), 2);
    }

    #[test]
    fn missing_timecode_file_is_an_error() {
        let dir = tempdir().unwrap();
        let mut opts = RunOptions::default();
        opts.tools.mkvextract = "true".to_string();
        let ctx = context_for(dir.path().to_path_buf(), opts);
        let mut state = state_with_selection();

        let err = ExtractStep::new().execute(&ctx, &mut state).unwrap_err();
        assert!(matches!(
            err,
            StepError::Extraction(ExtractionError::BadTimecodeFile { .. })
        ));
    }

    #[test]
    fn dry_run_defers_the_delay() {
        let dir = tempdir().unwrap();
        let mut opts = RunOptions::default();
        opts.dry_run = true;
        opts.tools.mkvextract = "definitely-not-mkvextract".to_string();
        let ctx = context_for(dir.path().to_path_buf(), opts);
        let mut state = state_with_selection();

        let outcome = ExtractStep::new().execute(&ctx, &mut state).unwrap();
        assert_eq!(outcome, StepOutcome::Success);

        let jobs = state.jobs.unwrap();
        assert_eq!(jobs[0].delay_ms, 0);
        assert!(state.temp_files.is_empty());
    }

    #[test]
    fn missing_selection_is_an_input_error() {
        let dir = tempdir().unwrap();
        let ctx = context_for(dir.path().to_path_buf(), RunOptions::default());
        let mut state = JobState::new();

        let err = ExtractStep::new().execute(&ctx, &mut state).unwrap_err();
        assert!(matches!(err, StepError::InvalidInput(_)));
    }
}
