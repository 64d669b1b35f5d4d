//! Remux planning and mkvmerge option generation.

mod options_builder;
mod plan_builder;

pub use options_builder::MkvmergeOptionsBuilder;
pub use plan_builder::{build_remux_plan, remux_output_path};
