//! Convert step - transcodes each extracted DTS payload to AC-3.
//!
//! One decoder|encoder pipeline per track, run in selection order. The
//! DTS payload is the largest working file, so it is removed as soon as
//! its encoder finishes (unless `--keep` retains it).

use std::fs;
use std::path::Path;

use crate::convert::{decoder_args, encoder_args, transcode};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

/// Convert step for running the decode/encode pipelines.
pub struct ConvertStep;

impl ConvertStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConvertStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ConvertStep {
    fn name(&self) -> &str {
        "Convert"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        // Custom tool arguments are operator input; reject malformed pairs
        // before any decoding starts.
        decoder_args(&ctx.opts.custom_decode_args)?;
        encoder_args(&ctx.opts.custom_encode_args)?;
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let mut jobs = state
            .jobs
            .take()
            .ok_or_else(|| StepError::invalid_input("no conversion jobs; extraction must run first"))?;

        let decoder = decoder_args(&ctx.opts.custom_decode_args)?;
        let encoder = encoder_args(&ctx.opts.custom_encode_args)?;

        for job in &mut jobs {
            ctx.log
                .info(&format!("converting {}", job.track.display_name()));
            let status = transcode(&ctx.runner, &ctx.opts.tools, &decoder, &encoder, job)?;

            if status.executed() {
                state.temp_files.register(&job.ac3_path);

                job.dts_size = file_size(&job.dts_path);
                job.ac3_size = file_size(&job.ac3_path);
                if let (Some(dts), Some(ac3)) = (job.dts_size, job.ac3_size) {
                    ctx.log.info(&format!(
                        "track {}: {} bytes DTS became {} bytes AC-3",
                        job.track_id(),
                        dts,
                        ac3
                    ));
                }

                if job.keep_dts {
                    state.temp_files.forget(&job.dts_path);
                    ctx.log.info(&format!("keeping {}", job.dts_path.display()));
                } else {
                    match fs::remove_file(&job.dts_path) {
                        Ok(()) => {
                            state.temp_files.forget(&job.dts_path);
                            ctx.log.debug(&format!("removed {}", job.dts_path.display()));
                        }
                        Err(e) => ctx.log.warn(&format!(
                            "could not remove {}: {}",
                            job.dts_path.display(),
                            e
                        )),
                    }
                }
            }
        }

        state.jobs = Some(jobs);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        let Some(jobs) = &state.jobs else {
            return Err(StepError::invalid_output("conversion jobs not recorded"));
        };
        if !ctx.executing() {
            return Ok(());
        }
        for job in jobs {
            let usable = fs::metadata(&job.ac3_path)
                .map(|m| m.len() > 0)
                .unwrap_or(false);
            if !usable {
                return Err(StepError::invalid_output(format!(
                    "encoder produced no usable output at {}",
                    job.ac3_path.display()
                )));
            }
        }
        Ok(())
    }
}

fn file_size(path: &Path) -> Option<u64> {
    fs::metadata(path).map(|m| m.len()).ok()
}
