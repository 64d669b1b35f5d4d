//! Inspect step - probes the container and builds the track catalog.
//!
//! Also hosts the force guard: a container that already carries an AC-3
//! track was almost certainly converted before, so the whole file is
//! skipped unless `--force` overrides.

use crate::extraction::catalog_for;
use crate::models::{TrackCatalog, TrackDescriptor, AC3_CODEC};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

/// Inspect step for probing the input container.
pub struct InspectStep;

impl InspectStep {
    pub fn new() -> Self {
        Self
    }

    /// First AC-3 audio track already in the container, when one exists.
    fn existing_ac3(catalog: &TrackCatalog) -> Option<&TrackDescriptor> {
        catalog.audio_tracks().find(|t| t.codec == AC3_CODEC)
    }
}

impl Default for InspectStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for InspectStep {
    fn name(&self) -> &str {
        "Inspect"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if !ctx.input.exists() {
            return Err(StepError::invalid_input(format!(
                "input file not found: {}",
                ctx.input.display()
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let catalog = catalog_for(&ctx.runner, &ctx.opts.tools.mkvmerge, &ctx.input)?;

        ctx.log
            .info(&format!("found {} track(s)", catalog.len()));
        for track in catalog.iter() {
            ctx.log.debug(&track.display_name());
        }

        if !ctx.opts.force {
            if let Some(ac3) = Self::existing_ac3(&catalog) {
                return Ok(StepOutcome::Skipped(format!(
                    "already contains an AC-3 track (id {}); use --force to convert anyway",
                    ac3.id
                )));
            }
        }

        state.catalog = Some(catalog);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if !state.has_catalog() {
            return Err(StepError::invalid_output("track catalog not recorded"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunOptions;
    use crate::logging::{JobLog, LogConfig};
    use crate::tools::ToolRunner;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tempfile::tempdir;

    /// A stand-in inspector that prints a fixed track listing.
    fn fake_mkvmerge(dir: &Path, listing: &str) -> PathBuf {
        let path = dir.join("fake-mkvmerge");
        fs::write(&path, format!("#!/bin/sh\ncat <<'EOF'\n{}\nEOF\n", listing)).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn context_for(input: PathBuf, opts: RunOptions) -> Context {
        let log = Arc::new(JobLog::detached("inspect-test", LogConfig::default()));
        let runner = ToolRunner::new(opts.exec_mode(), None, Arc::clone(&log));
        Context::new(input, "movie", opts, log, runner)
    }

    const DTS_ONLY: &str = "Track ID 1: video (V_MPEG4/ISO/AVC)\n\
                            Track ID 2: audio (A_DTS)";
    const WITH_AC3: &str = "Track ID 1: video (V_MPEG4/ISO/AVC)\n\
                            Track ID 2: audio (A_DTS)\n\
                            Track ID 3: audio (A_AC3)";

    #[test]
    fn missing_input_fails_validation() {
        let ctx = context_for(PathBuf::from("/nonexistent/movie.mkv"), RunOptions::default());
        let err = InspectStep::new().validate_input(&ctx).unwrap_err();
        assert!(matches!(err, StepError::InvalidInput(_)));
    }

    #[test]
    fn catalog_lands_in_state() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("movie.mkv");
        fs::write(&input, b"").unwrap();

        let mut opts = RunOptions::default();
        opts.tools.mkvmerge = fake_mkvmerge(dir.path(), DTS_ONLY).display().to_string();

        let ctx = context_for(input, opts);
        let mut state = JobState::new();
        let outcome = InspectStep::new().execute(&ctx, &mut state).unwrap();

        assert_eq!(outcome, StepOutcome::Success);
        let catalog = state.catalog.expect("catalog stored");
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get(2).unwrap().is_dts());
    }

    #[test]
    fn existing_ac3_skips_the_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("movie.mkv");
        fs::write(&input, b"").unwrap();

        let mut opts = RunOptions::default();
        opts.tools.mkvmerge = fake_mkvmerge(dir.path(), WITH_AC3).display().to_string();

        let ctx = context_for(input, opts);
        let mut state = JobState::new();
        let outcome = InspectStep::new().execute(&ctx, &mut state).unwrap();

        match outcome {
            StepOutcome::Skipped(reason) => {
                assert!(reason.contains("id 3"));
                assert!(reason.contains("--force"));
            }
            other => panic!("expected skip, got {:?}", other),
        }
        assert!(!state.has_catalog());
    }

    #[test]
    fn force_overrides_the_guard() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("movie.mkv");
        fs::write(&input, b"").unwrap();

        let mut opts = RunOptions::default();
        opts.force = true;
        opts.tools.mkvmerge = fake_mkvmerge(dir.path(), WITH_AC3).display().to_string();

        let ctx = context_for(input, opts);
        let mut state = JobState::new();
        let outcome = InspectStep::new().execute(&ctx, &mut state).unwrap();

        assert_eq!(outcome, StepOutcome::Success);
        assert_eq!(state.catalog.unwrap().len(), 3);
    }
}
