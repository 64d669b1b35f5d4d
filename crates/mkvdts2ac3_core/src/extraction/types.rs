//! Error types for inspection and extraction.

use std::path::PathBuf;

use thiserror::Error;

use crate::tools::ToolError;

/// Errors from container inspection or track extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The inspector could not make sense of the file.
    #[error("not a usable Matroska file: {0}")]
    InvalidInputFile(PathBuf),

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    /// The timecode file did not have the expected v2 shape.
    #[error("unreadable timecode file {path}: {reason}")]
    BadTimecodeFile { path: PathBuf, reason: String },

    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// Result type for extraction operations.
pub type ExtractionResult<T> = Result<T, ExtractionError>;
