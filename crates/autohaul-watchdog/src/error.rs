//! Error types for the watchdog.

use autohaul_scheduler::SchedError;
use thiserror::Error;

/// Errors that can occur during watchdog setup and registry operations.
#[derive(Debug, Clone, Error)]
pub enum WatchdogError {
    /// Task not found in the watchdog registry.
    #[error("Task not registered: {0}")]
    TaskNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The check loop is already running.
    #[error("Watchdog already running")]
    AlreadyRunning,

    /// The check loop could not be started.
    #[error("Watchdog check loop failed to start: {0}")]
    Scheduler(#[from] SchedError),
}

impl WatchdogError {
    /// Create a task not found error.
    #[must_use]
    pub fn task_not_found(task: impl Into<String>) -> Self {
        Self::TaskNotFound(task.into())
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }
}

/// A specialized `Result` type for watchdog operations.
pub type WatchdogResult<T> = std::result::Result<T, WatchdogError>;
