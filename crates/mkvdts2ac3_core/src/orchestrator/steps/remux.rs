//! Remux step - merges the new AC-3 tracks into the output container, or
//! delivers them as standalone files in external mode.
//!
//! The remux output is staged as `<title>.new.mkv` in the working
//! directory, then moved over the original (the default) or next to it
//! (`--new`). mkvmerge's exit code 1 means warnings only; the container
//! was still written and the run continues.

use std::fs;
use std::path::Path;
use std::process::Command;

use crate::models::{OutputMode, RemuxPlan};
use crate::mux::{build_remux_plan, remux_output_path, MkvmergeOptionsBuilder};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, DeliveryOutput, JobState, StepOutcome};
use crate::tools::ToolError;

/// Remux step for producing the final deliverables.
pub struct RemuxStep;

impl RemuxStep {
    pub fn new() -> Self {
        Self
    }

    /// Rebuild the container with the new AC-3 tracks merged in.
    fn remux_container(
        &self,
        ctx: &Context,
        state: &mut JobState,
        plan: &RemuxPlan,
    ) -> StepResult<DeliveryOutput> {
        let staged = remux_output_path(&ctx.opts.working_dir, &ctx.title);
        let tokens = MkvmergeOptionsBuilder::new(plan, &ctx.opts, &ctx.input, &staged).build();

        let mut cmd = Command::new(&ctx.opts.tools.mkvmerge);
        cmd.args(&tokens);

        let exit_code = ctx.runner.run_status(&mut cmd)?;
        if exit_code.is_some() {
            // Even a failed merge can leave a partial file behind; track it
            // before looking at the exit code.
            state.temp_files.register(&staged);
        }

        match exit_code {
            None | Some(0) => {}
            // mkvmerge reserves exit code 1 for warnings; the output file
            // is complete.
            Some(1) => {
                ctx.log
                    .warn("mkvmerge reported warnings; the output container was still written")
            }
            Some(code) => {
                return Err(StepError::Tool(ToolError::Failed {
                    tool: "mkvmerge".to_string(),
                    exit_code: code,
                    message: String::new(),
                }));
            }
        }

        let final_path = match plan.output_mode {
            OutputMode::AdjacentNewFile => ctx.input_dir().join(format!("{}.new.mkv", ctx.title)),
            _ => ctx.input.clone(),
        };

        if exit_code.is_some() {
            move_file(&staged, &final_path)?;
            state.temp_files.forget(&staged);
            ctx.log.info(&format!("wrote {}", final_path.display()));
        } else {
            ctx.log.info(&format!("would write {}", final_path.display()));
        }

        Ok(DeliveryOutput {
            container: Some(final_path),
            external_files: Vec::new(),
            exit_code,
        })
    }

    /// Copy the AC-3 files next to the original container.
    ///
    /// The working-directory intermediates stay registered, so batch
    /// cleanup removes them once the copies are delivered.
    fn deliver_external(
        &self,
        ctx: &Context,
        plan: &RemuxPlan,
    ) -> StepResult<DeliveryOutput> {
        let mut delivered = Vec::new();
        for item in &plan.items {
            let dest = ctx
                .input_dir()
                .join(format!("{}.{}.ac3", ctx.title, item.job.track_id()));

            if ctx.executing() {
                fs::copy(&item.job.ac3_path, &dest).map_err(|e| {
                    StepError::io_error(
                        format!(
                            "copying {} to {}",
                            item.job.ac3_path.display(),
                            dest.display()
                        ),
                        e,
                    )
                })?;
                ctx.log.info(&format!("wrote {}", dest.display()));
            } else {
                ctx.log.info(&format!("would write {}", dest.display()));
            }
            delivered.push(dest);
        }

        Ok(DeliveryOutput {
            container: None,
            external_files: delivered,
            exit_code: None,
        })
    }
}

impl Default for RemuxStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for RemuxStep {
    fn name(&self) -> &str {
        "Remux"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let jobs = state
            .jobs
            .clone()
            .ok_or_else(|| StepError::invalid_input("no conversion jobs; conversion must run first"))?;

        let plan = {
            let catalog = state.catalog.as_ref().ok_or_else(|| {
                StepError::invalid_input("no track catalog; inspection must run first")
            })?;
            build_remux_plan(catalog, jobs, &ctx.opts, &ctx.log)
        };

        let delivery = if plan.needs_remux() {
            self.remux_container(ctx, state, &plan)?
        } else {
            self.deliver_external(ctx, &plan)?
        };

        state.plan = Some(plan);
        state.delivery = Some(delivery);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        let Some(delivery) = &state.delivery else {
            return Err(StepError::invalid_output("delivery not recorded"));
        };
        if ctx.executing() {
            if let Some(container) = &delivery.container {
                if !container.exists() {
                    return Err(StepError::invalid_output(format!(
                        "container {} was not written",
                        container.display()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Move with a cross-filesystem fallback: plain rename first, copy plus
/// delete when the working directory sits on another filesystem.
fn move_file(from: &Path, to: &Path) -> StepResult<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to).map_err(|e| {
        StepError::io_error(format!("copying {} to {}", from.display(), to.display()), e)
    })?;
    fs::remove_file(from)
        .map_err(|e| StepError::io_error(format!("removing {}", from.display()), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunOptions;
    use crate::logging::{JobLog, LogConfig};
    use crate::models::{
        ConversionJob, TrackCatalog, TrackDescriptor, TrackType, DTS_CODEC,
    };
    use crate::tools::ToolRunner;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::tempdir;

    /// A stand-in remux tool that writes whatever path follows `-o`.
    fn fake_mkvmerge(dir: &Path, exit_code: i32) -> PathBuf {
        let path = dir.join("fake-mkvmerge");
        let script = format!(
            "#!/bin/sh\n\
             while [ $# -gt 0 ]; do\n\
             \tif [ \"$1\" = \"-o\" ]; then shift; echo merged > \"$1\"; fi\n\
             \tshift\n\
             done\n\
             exit {}\n",
            exit_code
        );
        fs::write(&path, script).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn context_for(input: PathBuf, working_dir: PathBuf, mut opts: RunOptions) -> Context {
        opts.working_dir = working_dir;
        let log = Arc::new(JobLog::detached("remux-test", LogConfig::default()));
        let runner = ToolRunner::new(opts.exec_mode(), None, Arc::clone(&log));
        Context::new(input, "movie", opts, log, runner)
    }

    fn converted_state(working_dir: &Path) -> JobState {
        let mut catalog = TrackCatalog::new();
        catalog.insert(TrackDescriptor::new(1, TrackType::Video, "V_MPEG4/ISO/AVC"));
        catalog.insert(TrackDescriptor::new(2, TrackType::Audio, DTS_CODEC));

        let track = TrackDescriptor::new(2, TrackType::Audio, DTS_CODEC);
        let ac3 = working_dir.join("movie.2.ac3");
        fs::write(&ac3, b"ac3").unwrap();
        let job = ConversionJob::new(
            track,
            working_dir.join("movie.2.tc"),
            working_dir.join("movie.2.dts"),
            ac3.clone(),
            false,
        );

        let mut state = JobState::new();
        state.catalog = Some(catalog);
        state.temp_files.register(&ac3);
        state.jobs = Some(vec![job]);
        state
    }

    #[test]
    fn in_place_replace_overwrites_the_original() {
        let dir = tempdir().unwrap();
        let work = tempdir().unwrap();
        let input = dir.path().join("movie.mkv");
        fs::write(&input, b"original").unwrap();

        let mut opts = RunOptions::default();
        opts.tools.mkvmerge = fake_mkvmerge(dir.path(), 0).display().to_string();

        let ctx = context_for(input.clone(), work.path().to_path_buf(), opts);
        let mut state = converted_state(work.path());
        let outcome = RemuxStep::new().execute(&ctx, &mut state).unwrap();

        assert_eq!(outcome, StepOutcome::Success);
        assert_eq!(fs::read_to_string(&input).unwrap().trim(), "merged");
        // Staged file was moved, not left behind.
        assert!(!work.path().join("movie.new.mkv").exists());

        let delivery = state.delivery.unwrap();
        assert_eq!(delivery.container.as_deref(), Some(input.as_path()));
        assert_eq!(delivery.exit_code, Some(0));
    }

    #[test]
    fn adjacent_mode_leaves_the_original_alone() {
        let dir = tempdir().unwrap();
        let work = tempdir().unwrap();
        let input = dir.path().join("movie.mkv");
        fs::write(&input, b"original").unwrap();

        let mut opts = RunOptions::default();
        opts.adjacent_file = true;
        opts.tools.mkvmerge = fake_mkvmerge(dir.path(), 0).display().to_string();

        let ctx = context_for(input.clone(), work.path().to_path_buf(), opts);
        let mut state = converted_state(work.path());
        RemuxStep::new().execute(&ctx, &mut state).unwrap();

        assert_eq!(fs::read_to_string(&input).unwrap(), "original");
        let adjacent = dir.path().join("movie.new.mkv");
        assert_eq!(fs::read_to_string(&adjacent).unwrap().trim(), "merged");
    }

    #[test]
    fn warning_exit_code_still_delivers() {
        let dir = tempdir().unwrap();
        let work = tempdir().unwrap();
        let input = dir.path().join("movie.mkv");
        fs::write(&input, b"original").unwrap();

        let mut opts = RunOptions::default();
        opts.tools.mkvmerge = fake_mkvmerge(dir.path(), 1).display().to_string();

        let ctx = context_for(input.clone(), work.path().to_path_buf(), opts);
        let mut state = converted_state(work.path());
        RemuxStep::new().execute(&ctx, &mut state).unwrap();

        assert_eq!(fs::read_to_string(&input).unwrap().trim(), "merged");
        assert_eq!(state.delivery.unwrap().exit_code, Some(1));
    }

    #[test]
    fn hard_failure_aborts_the_file() {
        let dir = tempdir().unwrap();
        let work = tempdir().unwrap();
        let input = dir.path().join("movie.mkv");
        fs::write(&input, b"original").unwrap();

        let mut opts = RunOptions::default();
        opts.tools.mkvmerge = fake_mkvmerge(dir.path(), 2).display().to_string();

        let ctx = context_for(input.clone(), work.path().to_path_buf(), opts);
        let mut state = converted_state(work.path());
        let err = RemuxStep::new().execute(&ctx, &mut state).unwrap_err();

        assert!(matches!(
            err,
            StepError::Tool(ToolError::Failed { exit_code: 2, .. })
        ));
        // The original is untouched on failure.
        assert_eq!(fs::read_to_string(&input).unwrap(), "original");
        // The partial staged output is tracked, so cleanup removes it.
        assert_eq!(state.temp_files.len(), 2);
    }

    #[test]
    fn external_mode_copies_next_to_the_original() {
        let dir = tempdir().unwrap();
        let work = tempdir().unwrap();
        let input = dir.path().join("movie.mkv");
        fs::write(&input, b"original").unwrap();

        let mut opts = RunOptions::default();
        opts.keep_external = true;
        opts.tools.mkvmerge = "definitely-not-mkvmerge".to_string();

        let ctx = context_for(input.clone(), work.path().to_path_buf(), opts);
        let mut state = converted_state(work.path());
        RemuxStep::new().execute(&ctx, &mut state).unwrap();

        let delivered = dir.path().join("movie.2.ac3");
        assert_eq!(fs::read_to_string(&delivered).unwrap(), "ac3");
        // The original container was never touched.
        assert_eq!(fs::read_to_string(&input).unwrap(), "original");
        // The working copy is still tracked for cleanup.
        assert_eq!(state.temp_files.len(), 1);

        let delivery = state.delivery.unwrap();
        assert!(delivery.container.is_none());
        assert_eq!(delivery.external_files, vec![delivered]);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = tempdir().unwrap();
        let work = tempdir().unwrap();
        let input = dir.path().join("movie.mkv");
        fs::write(&input, b"original").unwrap();

        let mut opts = RunOptions::default();
        opts.dry_run = true;
        opts.tools.mkvmerge = "definitely-not-mkvmerge".to_string();

        let ctx = context_for(input.clone(), work.path().to_path_buf(), opts);
        let mut state = converted_state(work.path());
        let outcome = RemuxStep::new().execute(&ctx, &mut state).unwrap();

        assert_eq!(outcome, StepOutcome::Success);
        assert_eq!(fs::read_to_string(&input).unwrap(), "original");
        assert_eq!(state.delivery.unwrap().exit_code, None);
    }
}
