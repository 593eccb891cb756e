//! Pipeline and step errors.
//!
//! A run error names the run and the failing step; the step error below it
//! carries the module error (discovery, merge, I/O) that caused it.

use std::io;

use thiserror::Error;

use crate::discovery::DiscoveryError;
use crate::merge::MergeError;

/// Why a run stopped.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A step returned an error.
    #[error("Run '{job_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        job_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// The project directory is not usable.
    #[error("Run '{job_name}' failed validation: {message}")]
    ValidationFailed { job_name: String, message: String },

    /// The work directory could not be created.
    #[error("Run '{job_name}' setup failed: {message}")]
    SetupFailed { job_name: String, message: String },
}

impl PipelineError {
    /// Create a step failed error.
    pub fn step_failed(
        job_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            job_name: job_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    /// Create a validation failed error.
    pub fn validation_failed(job_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            job_name: job_name.into(),
            message: message.into(),
        }
    }

    /// Create a setup failed error.
    pub fn setup_failed(job_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            job_name: job_name.into(),
            message: message.into(),
        }
    }

    /// The step error underneath, if a step failed.
    pub fn step_error(&self) -> Option<&StepError> {
        match self {
            Self::StepFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Failure inside one step.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// A precondition was not met.
    #[error("Precondition not met: {0}")]
    PreconditionFailed(String),

    /// No clips or no music.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// The final merge failed.
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// Every clip failed to transcode.
    #[error("No videos available to merge ({failed} failed to transcode)")]
    NothingToMerge { failed: usize },
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

    /// Create a precondition failed error.
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
