//! Pipeline orchestrator for converting one container at a time.
//!
//! The conversion of each input file runs as a sequence of steps that
//! validate, execute, and record their results in a shared job state.
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: Inspect   (probe container, build catalog, force guard)
//!     ├── Step: Select    (apply the selection policy)
//!     ├── Step: Extract   (timecodes + DTS payloads via mkvextract)
//!     ├── Step: Convert   (dcadec | aften per track)
//!     └── Step: Remux     (mkvmerge, or external AC-3 delivery)
//! ```
//!
//! The batch driver (`run_batch`) owns the per-file loop: log setup,
//! pipeline execution, working-file cleanup, and the final report.

mod driver;
mod errors;
mod pipeline;
mod step;
pub mod steps;
mod types;

pub use driver::{process_file, run_batch};
pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{ConvertStep, ExtractStep, InspectStep, RemuxStep, SelectStep};
pub use types::{Context, DeliveryOutput, JobState, StepOutcome, TempSet};

/// Create the standard pipeline with all steps in conversion order.
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(InspectStep::new())
        .with_step(SelectStep::new())
        .with_step(ExtractStep::new())
        .with_step(ConvertStep::new())
        .with_step(RemuxStep::new())
}
