//! Error types for the conversion pipeline.
//!
//! Errors carry context that chains through layers:
//! File → Step → Operation → Detail

use std::io;

use thiserror::Error;

use crate::convert::PlanError;
use crate::extraction::ExtractionError;
use crate::selection::SelectionError;
use crate::tools::ToolError;

/// Top-level pipeline error with file context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A step failed during execution.
    #[error("'{file}' failed at step '{step_name}': {source}")]
    StepFailed {
        file: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// The file could not be prepared for processing (log, working dir).
    #[error("'{file}' setup failed: {message}")]
    SetupFailed { file: String, message: String },
}

impl PipelineError {
    /// Create a step failed error.
    pub fn step_failed(
        file: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            file: file.into(),
            step_name: step_name.into(),
            source,
        }
    }

    /// Create a setup failed error.
    pub fn setup_failed(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            file: file.into(),
            message: message.into(),
        }
    }
}

/// Error from a pipeline step.
///
/// Domain errors pass through transparently so the operator sees the
/// underlying message (`no DTS tracks found`, `mkvextract failed ...`)
/// rather than a generic step wrapper.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation failed.
    #[error("input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("output validation failed: {0}")]
    InvalidOutput(String),

    /// Probing or extraction failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Track selection failed.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Conversion planning failed.
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// An external tool failed.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// File I/O error with operation context.
    #[error("I/O error while {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl StepError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Create an I/O error with context.
    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
