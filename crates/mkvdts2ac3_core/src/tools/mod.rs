//! External tool invocation.
//!
//! All external processes (mkvmerge, mkvextract, dcadec, aften) are started
//! through the [`ToolRunner`], which owns the dry-run / step-confirm gating
//! and the optional per-invocation timeout.

mod runner;

pub use runner::{render_command, ExecMode, RunStatus, ToolError, ToolResult, ToolRunner};
