//! Scheduling priority hints.
//!
//! A task asks for a priority matching its criticality when its thread
//! starts. The request is a hint: a refusal is reported to the caller, who
//! logs it and keeps running at default priority.

use std::fmt;
use std::sync::Arc;

use crate::error::SchedResult;

/// Relative criticality of a periodic task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskPriority {
    /// Sensing and bridging.
    Lowest,
    /// Navigation.
    Medium,
    /// Command arbitration.
    High,
    /// Fault monitoring.
    Highest,
}

impl TaskPriority {
    /// `SCHED_FIFO` level requested on Linux.
    #[must_use]
    pub fn fifo_level(self) -> i32 {
        match self {
            Self::Lowest => 60,
            Self::Medium => 70,
            Self::High => 80,
            Self::Highest => 90,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lowest => write!(f, "lowest"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Highest => write!(f, "highest"),
        }
    }
}

/// Applies a priority hint to the calling thread.
pub trait PriorityElevator: Send + Sync {
    /// Raise the calling thread to `priority`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refused or does not support the request.
    fn elevate(&self, priority: TaskPriority) -> SchedResult<()>;
}

/// Uses the platform's real-time scheduling class.
///
/// On Linux this is `SCHED_FIFO` and usually needs `CAP_SYS_NICE`. On Windows it
/// maps to thread priority levels. Other platforms report
/// [`SchedError::Unsupported`](crate::error::SchedError::Unsupported).
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeElevator;

impl PriorityElevator for NativeElevator {
    fn elevate(&self, priority: TaskPriority) -> SchedResult<()> {
        #[cfg(target_os = "linux")]
        {
            crate::linux::elevate_current_thread(priority)
        }

        #[cfg(target_os = "windows")]
        {
            crate::windows::elevate_current_thread(priority)
        }

        #[cfg(not(any(target_os = "windows", target_os = "linux")))]
        {
            crate::fallback::elevate_current_thread(priority)
        }
    }
}

/// Accepts every request without touching the scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopElevator;

impl PriorityElevator for NoopElevator {
    fn elevate(&self, _priority: TaskPriority) -> SchedResult<()> {
        Ok(())
    }
}

/// Shared handle to the native elevator.
#[must_use]
pub fn native_elevator() -> Arc<dyn PriorityElevator> {
    Arc::new(NativeElevator)
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(target_os = "linux")]
    use crate::error::SchedError;

    #[test]
    fn fifo_levels_follow_criticality() {
        let levels: Vec<i32> = [
            TaskPriority::Lowest,
            TaskPriority::Medium,
            TaskPriority::High,
            TaskPriority::Highest,
        ]
        .into_iter()
        .map(TaskPriority::fifo_level)
        .collect();
        assert_eq!(levels, vec![60, 70, 80, 90]);
    }

    #[test]
    fn noop_always_succeeds() {
        assert_eq!(NoopElevator.elevate(TaskPriority::Highest), Ok(()));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn native_elevation_reports_refusal_as_elevation_failure() {
        // Unprivileged test runners are refused with EPERM.
        let result = NativeElevator.elevate(TaskPriority::Lowest);
        assert!(
            matches!(result, Ok(()) | Err(SchedError::ElevationFailed { .. })),
            "{result:?}"
        );
    }
}
