//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Every field has a serde default so partial files parse cleanly.

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// External tool locations.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Conversion defaults.
    #[serde(default)]
    pub conversion: ConversionSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tools: ToolSettings::default(),
            conversion: ConversionSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Locations of the external tools the converter drives.
///
/// Bare names resolve through `PATH`; absolute paths pin a specific build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Matroska muxer (also used with `-i` as the inspector).
    #[serde(default = "default_mkvmerge")]
    pub mkvmerge: String,

    /// Matroska track/timecode extractor.
    #[serde(default = "default_mkvextract")]
    pub mkvextract: String,

    /// DTS decoder.
    #[serde(default = "default_dcadec")]
    pub dcadec: String,

    /// AC-3 encoder.
    #[serde(default = "default_aften")]
    pub aften: String,
}

fn default_mkvmerge() -> String {
    "mkvmerge".to_string()
}

fn default_mkvextract() -> String {
    "mkvextract".to_string()
}

fn default_dcadec() -> String {
    "dcadec".to_string()
}

fn default_aften() -> String {
    "aften".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            mkvmerge: default_mkvmerge(),
            mkvextract: default_mkvextract(),
            dcadec: default_dcadec(),
            aften: default_aften(),
        }
    }
}

/// Conversion defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionSettings {
    /// Working directory for intermediate track files.
    #[serde(default = "default_working_dir")]
    pub working_dir: String,

    /// Per-invocation timeout in seconds. 0 disables the timeout.
    #[serde(default)]
    pub tool_timeout_secs: u64,
}

fn default_working_dir() -> String {
    "/tmp".to_string()
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            tool_timeout_secs: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Write a per-file conversion transcript.
    #[serde(default)]
    pub job_logs: bool,

    /// Directory for transcript logs.
    #[serde(default = "default_log_directory")]
    pub directory: String,
}

fn default_log_directory() -> String {
    ".logs".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            job_logs: false,
            directory: default_log_directory(),
        }
    }
}
