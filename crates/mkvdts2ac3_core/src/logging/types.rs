//! Logging types and configuration.

use std::path::PathBuf;

/// Configuration for per-file transcript logging.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Directory for transcript files. `None` disables file logging.
    pub file_dir: Option<PathBuf>,
    /// Prefix transcript lines with a wall-clock timestamp.
    pub timestamps: bool,
}

impl LogConfig {
    /// File logging into the given directory, with timestamps.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            file_dir: Some(dir.into()),
            timestamps: true,
        }
    }
}

/// Message prefix types for consistent transcript formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagePrefix {
    /// Shell command: `$ command`
    Command,
    /// Phase marker: `=== Phase ===`
    Phase,
    /// Success: `[SUCCESS]`
    Success,
    /// Warning: `[WARNING]`
    Warning,
    /// Error: `[ERROR]`
    Error,
    /// Debug: `[DEBUG]`
    Debug,
    /// No prefix
    None,
}

impl MessagePrefix {
    /// Format a message with this prefix.
    pub fn format(&self, message: &str) -> String {
        match self {
            MessagePrefix::Command => format!("$ {}", message),
            MessagePrefix::Phase => format!("=== {} ===", message),
            MessagePrefix::Success => format!("[SUCCESS] {}", message),
            MessagePrefix::Warning => format!("[WARNING] {}", message),
            MessagePrefix::Error => format!("[ERROR] {}", message),
            MessagePrefix::Debug => format!("[DEBUG] {}", message),
            MessagePrefix::None => message.to_string(),
        }
    }
}
