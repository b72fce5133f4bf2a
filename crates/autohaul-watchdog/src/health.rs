//! Per-task heartbeat records.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Liveness of a registered task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Registered but no heartbeat yet; never flagged.
    #[default]
    Unknown,
    /// Heartbeats arriving within the timeout.
    Healthy,
    /// At least one timeout window passed since the last heartbeat.
    Stalled,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Unknown => write!(f, "Unknown"),
            HealthStatus::Healthy => write!(f, "Healthy"),
            HealthStatus::Stalled => write!(f, "Stalled"),
        }
    }
}

/// Heartbeat bookkeeping for one task.
///
/// Created by [`Watchdog::register_task`](crate::Watchdog::register_task) and
/// mutated only by heartbeats and the watchdog's check loop.
#[derive(Debug, Clone, Copy)]
pub struct TaskHealthRecord {
    /// Allowed silence before the task is flagged.
    pub timeout: Duration,
    /// Last heartbeat, or the last detection time after a stall.
    pub last_heartbeat: Instant,
    /// A heartbeat has been received at least once.
    pub ever_reported: bool,
    /// Stalls detected since the last heartbeat.
    pub consecutive_failures: u32,
    /// Heartbeats received since registration.
    pub heartbeats: u64,
}

impl TaskHealthRecord {
    /// New record registered at `now`.
    #[must_use]
    pub fn new(timeout: Duration, now: Instant) -> Self {
        Self {
            timeout,
            last_heartbeat: now,
            ever_reported: false,
            consecutive_failures: 0,
            heartbeats: 0,
        }
    }

    /// Derived liveness.
    #[must_use]
    pub fn status(&self) -> HealthStatus {
        if !self.ever_reported {
            HealthStatus::Unknown
        } else if self.consecutive_failures > 0 {
            HealthStatus::Stalled
        } else {
            HealthStatus::Healthy
        }
    }

    /// Record a heartbeat at `now`.
    pub fn heartbeat(&mut self, now: Instant) {
        self.last_heartbeat = now;
        self.ever_reported = true;
        self.consecutive_failures = 0;
        self.heartbeats = self.heartbeats.saturating_add(1);
    }

    /// Silence at `now` if it exceeds the timeout, else `None`.
    ///
    /// Tasks that never reported are never timed out.
    #[must_use]
    pub fn timed_out(&self, now: Instant) -> Option<Duration> {
        if !self.ever_reported {
            return None;
        }
        let elapsed = now.saturating_duration_since(self.last_heartbeat);
        (elapsed > self.timeout).then_some(elapsed)
    }

    /// Count a stall detected at `now` and open a new timeout window.
    pub fn record_stall(&mut self, now: Instant) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_heartbeat = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(100);

    #[test]
    fn never_reported_is_never_timed_out() {
        let start = Instant::now();
        let record = TaskHealthRecord::new(TIMEOUT, start);
        assert_eq!(record.status(), HealthStatus::Unknown);
        assert_eq!(record.timed_out(start + Duration::from_secs(60)), None);
    }

    #[test]
    fn timeout_comparison_is_strict() {
        let start = Instant::now();
        let mut record = TaskHealthRecord::new(TIMEOUT, start);
        record.heartbeat(start);

        assert_eq!(record.timed_out(start + TIMEOUT), None);
        assert_eq!(
            record.timed_out(start + TIMEOUT + Duration::from_millis(1)),
            Some(Duration::from_millis(101))
        );
    }

    #[test]
    fn stall_opens_new_window_and_heartbeat_clears_it() {
        let start = Instant::now();
        let mut record = TaskHealthRecord::new(TIMEOUT, start);
        record.heartbeat(start);

        let detected = start + Duration::from_millis(150);
        record.record_stall(detected);
        assert_eq!(record.status(), HealthStatus::Stalled);
        assert_eq!(record.timed_out(detected + Duration::from_millis(50)), None);

        record.heartbeat(detected + Duration::from_millis(60));
        assert_eq!(record.status(), HealthStatus::Healthy);
        assert_eq!(record.consecutive_failures, 0);
        assert_eq!(record.heartbeats, 2);
    }
}
