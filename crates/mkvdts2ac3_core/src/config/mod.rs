//! Configuration: persisted settings and per-run options.
//!
//! [`Settings`] is the TOML-backed state managed by [`ConfigManager`].
//! [`RunOptions`] is the immutable merge of CLI flags and settings that the
//! rest of the crate reads; it is built once per run and passed by reference.

mod manager;
mod options;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use options::{OptionsError, RunOptions};
pub use settings::{ConversionSettings, LoggingSettings, Settings, ToolSettings};
