//! Mock priority elevator for tests.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::{SchedError, SchedResult};
use crate::priority::{PriorityElevator, TaskPriority};

/// Records every elevation request and answers with a configurable outcome.
///
/// ```rust
/// use autohaul_scheduler::{MockPriorityElevator, PriorityElevator, TaskPriority};
///
/// let elevator = MockPriorityElevator::failing();
/// assert!(elevator.elevate(TaskPriority::High).is_err());
/// assert_eq!(elevator.requests(), vec![TaskPriority::High]);
/// ```
#[derive(Debug, Default)]
pub struct MockPriorityElevator {
    fail: AtomicBool,
    calls: AtomicUsize,
    requests: Mutex<Vec<TaskPriority>>,
}

impl MockPriorityElevator {
    /// Mock that grants every request.
    #[must_use]
    pub fn granting() -> Self {
        Self::default()
    }

    /// Mock that refuses every request with `EPERM`.
    #[must_use]
    pub fn failing() -> Self {
        let mock = Self::default();
        mock.set_failing(true);
        mock
    }

    /// Switch between granting and refusing.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of elevation requests seen.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requested priorities in call order.
    #[must_use]
    pub fn requests(&self) -> Vec<TaskPriority> {
        self.requests.lock().clone()
    }
}

impl PriorityElevator for MockPriorityElevator {
    fn elevate(&self, priority: TaskPriority) -> SchedResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(priority);
        if self.fail.load(Ordering::SeqCst) {
            Err(SchedError::elevation_failed(priority, 1))
        } else {
            Ok(())
        }
    }
}
