//! Error types for the performance monitor.

use thiserror::Error;

/// Errors from performance monitor queries and configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PerfError {
    /// No statistics exist for the task.
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl PerfError {
    /// Create an unknown task error.
    #[must_use]
    pub fn unknown_task(task: impl Into<String>) -> Self {
        Self::UnknownTask(task.into())
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }
}

/// A specialized `Result` type for performance monitor operations.
pub type PerfResult<T> = Result<T, PerfError>;
