//! Error types for the scheduler crate.

use std::time::Duration;
use thiserror::Error;

use crate::priority::TaskPriority;

/// Errors raised while setting up or elevating a periodic task.
///
/// None of these escape a running loop: elevation failures are logged and
/// the loop continues at default priority.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedError {
    /// The OS refused the requested scheduling priority.
    #[error("Failed to elevate to {priority} priority (os error {code})")]
    ElevationFailed {
        /// Requested priority.
        priority: TaskPriority,
        /// Raw OS error code.
        code: i32,
    },

    /// The platform has no real-time scheduling class.
    #[error("Priority elevation not supported on this platform")]
    Unsupported,

    /// A task period must be non-zero.
    #[error("Invalid period for task '{task}': {period:?}")]
    InvalidPeriod {
        /// Task name.
        task: String,
        /// Rejected period.
        period: Duration,
    },

    /// The OS could not start the task thread.
    #[error("Failed to spawn task '{task}': {reason}")]
    SpawnFailed {
        /// Task name.
        task: String,
        /// OS error text.
        reason: String,
    },
}

impl SchedError {
    /// Create an elevation failure error.
    #[must_use]
    pub fn elevation_failed(priority: TaskPriority, code: i32) -> Self {
        Self::ElevationFailed { priority, code }
    }

    /// Create an invalid period error.
    #[must_use]
    pub fn invalid_period(task: impl Into<String>, period: Duration) -> Self {
        Self::InvalidPeriod {
            task: task.into(),
            period,
        }
    }

    /// Create a spawn failure error.
    #[must_use]
    pub fn spawn_failed(task: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SpawnFailed {
            task: task.into(),
            reason: reason.into(),
        }
    }
}

/// A specialized `Result` type for scheduler operations.
pub type SchedResult<T = ()> = Result<T, SchedError>;
