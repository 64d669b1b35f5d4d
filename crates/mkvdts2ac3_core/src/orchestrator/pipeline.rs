//! Pipeline runner that executes steps in sequence.

use super::errors::{PipelineError, PipelineResult};
use super::step::PipelineStep;
use super::types::{Context, JobState, StepOutcome};

/// Pipeline that runs a sequence of steps over one input container.
///
/// The pipeline executes steps in order, running validation before and
/// after each step. A step that returns `Skipped` ends the run early:
/// skipping is a whole-file decision (an AC-3 track already present means
/// nothing downstream has anything to do).
pub struct Pipeline {
    /// Steps to execute in order.
    steps: Vec<Box<dyn PipelineStep>>,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a step to the pipeline.
    pub fn add_step<S: PipelineStep + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Add a step (builder pattern).
    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.add_step(step);
        self
    }

    /// Run the pipeline with the given context and state.
    ///
    /// Executes each step in order:
    /// 1. Run `validate_input`
    /// 2. Run `execute`
    /// 3. Run `validate_output` (if execute returned Success)
    ///
    /// Returns what ran on success, or a `PipelineError` on failure.
    pub fn run(&self, ctx: &Context, state: &mut JobState) -> PipelineResult<PipelineRunResult> {
        let file = ctx.input.display().to_string();
        let mut result = PipelineRunResult {
            steps_completed: Vec::new(),
            skipped: None,
        };

        for step in &self.steps {
            let step_name = step.name();
            ctx.log.phase(step_name);

            ctx.log.debug(&format!("validating input for '{}'", step_name));
            if let Err(e) = step.validate_input(ctx) {
                ctx.log.error(&format!("input validation failed: {}", e));
                return Err(PipelineError::step_failed(&file, step_name, e));
            }

            ctx.log.debug(&format!("executing '{}'", step_name));
            let outcome = step.execute(ctx, state).map_err(|e| {
                ctx.log.error(&format!("execution failed: {}", e));
                PipelineError::step_failed(&file, step_name, e)
            })?;

            match outcome {
                StepOutcome::Success => {
                    ctx.log.debug(&format!("validating output for '{}'", step_name));
                    if let Err(e) = step.validate_output(ctx, state) {
                        ctx.log.error(&format!("output validation failed: {}", e));
                        return Err(PipelineError::step_failed(&file, step_name, e));
                    }

                    ctx.log.success(&format!("{} completed", step_name));
                    result.steps_completed.push(step_name.to_string());
                }
                StepOutcome::Skipped(reason) => {
                    ctx.log.info(&format!("{} skipped this file: {}", step_name, reason));
                    result.skipped = Some(reason);
                    return Ok(result);
                }
            }
        }

        ctx.log.success("pipeline completed");
        Ok(result)
    }

    /// Get the number of steps in the pipeline.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Get step names in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineRunResult {
    /// Steps that completed successfully, in order.
    pub steps_completed: Vec<String>,
    /// Why the run ended early, when a step decided the file needs no work.
    pub skipped: Option<String>,
}

impl PipelineRunResult {
    /// Whether every step ran to completion.
    pub fn completed(&self) -> bool {
        self.skipped.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunOptions;
    use crate::logging::{JobLog, LogConfig};
    use crate::orchestrator::errors::{StepError, StepResult};
    use crate::tools::{ExecMode, ToolRunner};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn test_context() -> Context {
        let log = Arc::new(JobLog::detached("pipeline-test", LogConfig::default()));
        let runner = ToolRunner::new(ExecMode::Execute, None, Arc::clone(&log));
        Context::new(
            PathBuf::from("/tmp/movie.mkv"),
            "movie",
            RunOptions::default(),
            log,
            runner,
        )
    }

    struct CountingStep {
        name: &'static str,
        execute_count: Arc<AtomicUsize>,
    }

    impl PipelineStep for CountingStep {
        fn name(&self) -> &str {
            self.name
        }

        fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
            Ok(())
        }

        fn execute(&self, _ctx: &Context, _state: &mut JobState) -> StepResult<StepOutcome> {
            self.execute_count.fetch_add(1, Ordering::SeqCst);
            Ok(StepOutcome::Success)
        }

        fn validate_output(&self, _ctx: &Context, _state: &JobState) -> StepResult<()> {
            Ok(())
        }
    }

    struct SkippingStep;

    impl PipelineStep for SkippingStep {
        fn name(&self) -> &str {
            "Skipper"
        }

        fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
            Ok(())
        }

        fn execute(&self, _ctx: &Context, _state: &mut JobState) -> StepResult<StepOutcome> {
            Ok(StepOutcome::Skipped("nothing to convert".to_string()))
        }

        fn validate_output(&self, _ctx: &Context, _state: &JobState) -> StepResult<()> {
            Ok(())
        }
    }

    struct FailingStep;

    impl PipelineStep for FailingStep {
        fn name(&self) -> &str {
            "Failer"
        }

        fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
            Ok(())
        }

        fn execute(&self, _ctx: &Context, _state: &mut JobState) -> StepResult<StepOutcome> {
            Err(StepError::invalid_input("broken"))
        }

        fn validate_output(&self, _ctx: &Context, _state: &JobState) -> StepResult<()> {
            Ok(())
        }
    }

    #[test]
    fn pipeline_builds_correctly() {
        let pipeline = Pipeline::new()
            .with_step(CountingStep {
                name: "Step1",
                execute_count: Arc::new(AtomicUsize::new(0)),
            })
            .with_step(CountingStep {
                name: "Step2",
                execute_count: Arc::new(AtomicUsize::new(0)),
            });

        assert_eq!(pipeline.step_count(), 2);
        assert_eq!(pipeline.step_names(), vec!["Step1", "Step2"]);
    }

    #[test]
    fn steps_run_in_order() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(CountingStep {
                name: "First",
                execute_count: Arc::clone(&first),
            })
            .with_step(CountingStep {
                name: "Second",
                execute_count: Arc::clone(&second),
            });

        let ctx = test_context();
        let mut state = JobState::new();
        let result = pipeline.run(&ctx, &mut state).unwrap();

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(result.steps_completed, vec!["First", "Second"]);
        assert!(result.completed());
    }

    #[test]
    fn skip_halts_remaining_steps() {
        let after = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new().with_step(SkippingStep).with_step(CountingStep {
            name: "Never",
            execute_count: Arc::clone(&after),
        });

        let ctx = test_context();
        let mut state = JobState::new();
        let result = pipeline.run(&ctx, &mut state).unwrap();

        assert_eq!(after.load(Ordering::SeqCst), 0);
        assert_eq!(result.skipped.as_deref(), Some("nothing to convert"));
        assert!(!result.completed());
    }

    #[test]
    fn failing_step_surfaces_as_pipeline_error() {
        let pipeline = Pipeline::new().with_step(FailingStep);

        let ctx = test_context();
        let mut state = JobState::new();
        let err = pipeline.run(&ctx, &mut state).unwrap_err();

        match err {
            PipelineError::StepFailed { step_name, .. } => assert_eq!(step_name, "Failer"),
            other => panic!("unexpected error: {}", other),
        }
    }
}
