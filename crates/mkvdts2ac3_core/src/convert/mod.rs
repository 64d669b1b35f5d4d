//! DTS to AC-3 conversion planning and execution.

mod plan;
mod transcode;

pub use plan::{
    build_jobs, container_title, decoder_args, derive_temp_paths, encoder_args, PlanError,
    PlanResult, TempPaths,
};
pub use transcode::transcode;
