//! Error types for the control loops.

use autohaul_perf::PerfError;
use autohaul_scheduler::SchedError;
use autohaul_watchdog::WatchdogError;
use thiserror::Error;

/// Errors raised while configuring, starting or stopping the control loops.
///
/// Per-cycle work never fails; these only come from setup and lifecycle calls.
#[derive(Debug, Clone, Error)]
pub enum ControlError {
    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The component's loop is already running.
    #[error("{0} is already running")]
    AlreadyRunning(String),

    /// The loop thread could not be started.
    #[error(transparent)]
    Scheduler(#[from] SchedError),

    /// Watchdog setup failed.
    #[error(transparent)]
    Watchdog(#[from] WatchdogError),

    /// Performance monitor setup failed.
    #[error(transparent)]
    Performance(#[from] PerfError),
}

impl ControlError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }

    /// Create an already running error.
    #[must_use]
    pub fn already_running(component: impl Into<String>) -> Self {
        Self::AlreadyRunning(component.into())
    }
}

/// A specialized `Result` type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;
