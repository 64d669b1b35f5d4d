//! Select step - applies the selection policy to the track catalog.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};
use crate::selection::select_tracks;

/// Select step for choosing which DTS tracks get converted.
pub struct SelectStep;

impl SelectStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SelectStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for SelectStep {
    fn name(&self) -> &str {
        "Select"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let catalog = state
            .catalog
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("no track catalog; inspection must run first"))?;

        let policy = ctx.opts.policy();
        ctx.log.debug(&format!("selection policy: {}", policy));

        let selection = select_tracks(catalog, policy)?;
        for track in &selection {
            ctx.log.info(&format!("will convert {}", track.display_name()));
        }

        state.selection = Some(selection);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        match &state.selection {
            Some(selection) if !selection.is_empty() => Ok(()),
            _ => Err(StepError::invalid_output("no tracks selected")),
        }
    }
}
