//! Per-cycle instrumentation and loop lifecycle shared by the control tasks.

use autohaul_perf::PerformanceMonitor;
use autohaul_scheduler::{NoopElevator, PeriodicTask, PeriodicTaskConfig, PriorityElevator};
use autohaul_watchdog::Watchdog;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use crate::error::{ControlError, ControlResult};

/// Watchdog, performance monitor and priority adapter handed to each loop.
///
/// Both monitors are optional; a detached set runs cycles with no
/// instrumentation, which is what the unit tests use.
#[derive(Clone)]
pub struct TaskServices {
    watchdog: Option<Arc<Watchdog>>,
    performance: Option<Arc<PerformanceMonitor>>,
    elevator: Arc<dyn PriorityElevator>,
}

impl TaskServices {
    /// Services with no monitors, using `elevator` for priority requests.
    #[must_use]
    pub fn new(elevator: Arc<dyn PriorityElevator>) -> Self {
        Self {
            watchdog: None,
            performance: None,
            elevator,
        }
    }

    /// Services with no monitors and no priority requests.
    #[must_use]
    pub fn detached() -> Self {
        Self::new(Arc::new(NoopElevator))
    }

    /// Attach a watchdog.
    #[must_use]
    pub fn with_watchdog(mut self, watchdog: Arc<Watchdog>) -> Self {
        self.watchdog = Some(watchdog);
        self
    }

    /// Attach a performance monitor.
    #[must_use]
    pub fn with_performance(mut self, performance: Arc<PerformanceMonitor>) -> Self {
        self.performance = Some(performance);
        self
    }

    /// The attached watchdog, if any.
    #[must_use]
    pub fn watchdog(&self) -> Option<&Arc<Watchdog>> {
        self.watchdog.as_ref()
    }

    /// The attached performance monitor, if any.
    #[must_use]
    pub fn performance(&self) -> Option<&Arc<PerformanceMonitor>> {
        self.performance.as_ref()
    }

    /// Priority adapter used when loops start.
    #[must_use]
    pub fn elevator(&self) -> &Arc<dyn PriorityElevator> {
        &self.elevator
    }

    /// Register `task` with both monitors.
    ///
    /// The watchdog timeout is derived from the period by the watchdog's
    /// own configuration.
    pub fn register(&self, task: &str, period: Duration) {
        if let Some(watchdog) = &self.watchdog {
            let timeout = watchdog.config().timeout_for(period);
            watchdog.register_task(task, timeout);
        }
        if let Some(performance) = &self.performance {
            performance.register_task(task, period);
        }
    }

    /// Remove `task` from the watchdog so a stopped loop is not reported as stalled.
    pub fn unregister(&self, task: &str) {
        if let Some(watchdog) = &self.watchdog
            && watchdog.unregister_task(task).is_err()
        {
            tracing::debug!(task, "Task was not registered with the watchdog");
        }
    }

    /// Run one cycle of `task`: measure `body`, then send a heartbeat.
    pub fn run_cycle<R>(&self, task: &str, body: impl FnOnce() -> R) -> R {
        let result = match &self.performance {
            Some(performance) => {
                let _measurement = performance.measure(task);
                body()
            }
            None => body(),
        };
        if let Some(watchdog) = &self.watchdog {
            watchdog.heartbeat(task);
        }
        result
    }
}

impl fmt::Debug for TaskServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskServices")
            .field("watchdog", &self.watchdog.is_some())
            .field("performance", &self.performance.is_some())
            .finish_non_exhaustive()
    }
}

/// Owns at most one running loop for a component.
#[derive(Debug, Default)]
pub(crate) struct TaskSlot {
    task: Mutex<Option<PeriodicTask>>,
}

impl TaskSlot {
    /// Start `cycle` on a periodic thread for `owner`.
    ///
    /// The loop holds a weak reference, so dropping the component stops
    /// doing work even before the slot is stopped.
    pub(crate) fn start<T>(
        &self,
        owner: &Arc<T>,
        services: &TaskServices,
        config: PeriodicTaskConfig,
        cycle: fn(&T),
    ) -> ControlResult<()>
    where
        T: Send + Sync + 'static,
    {
        let mut slot = self.task.lock();
        if slot.is_some() {
            return Err(ControlError::already_running(config.name.clone()));
        }
        config.validate()?;

        services.register(&config.name, config.period);

        let weak: Weak<T> = Arc::downgrade(owner);
        let cycle_services = services.clone();
        let name = config.name.clone();
        let task = PeriodicTask::spawn(config, Arc::clone(&services.elevator), move || {
            if let Some(owner) = weak.upgrade() {
                cycle_services.run_cycle(&name, || cycle(&owner));
            }
        })?;
        *slot = Some(task);
        Ok(())
    }

    /// Stop the loop and remove it from the watchdog. Returns false if it was not running.
    pub(crate) fn stop(&self, services: &TaskServices) -> bool {
        let task = self.task.lock().take();
        match task {
            Some(mut task) => {
                task.stop();
                services.unregister(task.name());
                true
            }
            None => false,
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.task.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autohaul_perf::PerformanceConfig;
    use autohaul_watchdog::WatchdogConfig;

    #[test]
    fn test_detached_cycle_runs_body() {
        let services = TaskServices::detached();
        let value = services.run_cycle("test", || 7);
        assert_eq!(value, 7);
    }

    #[test]
    fn test_cycle_records_measurement_and_heartbeat() {
        let watchdog = Arc::new(Watchdog::new(WatchdogConfig::default()));
        let performance = Arc::new(PerformanceMonitor::new(PerformanceConfig::default()));
        let services = TaskServices::detached()
            .with_watchdog(Arc::clone(&watchdog))
            .with_performance(Arc::clone(&performance));

        services.register("navigation", Duration::from_millis(50));
        services.run_cycle("navigation", || ());

        let stats = performance.get_stats("navigation");
        assert_eq!(stats.map(|s| s.sample_count), Some(1));
        let health = watchdog.task_health("navigation");
        assert_eq!(health.map(|h| h.heartbeats), Some(1));
    }

    #[test]
    fn test_register_uses_watchdog_timeout_policy() {
        let watchdog = Arc::new(Watchdog::new(WatchdogConfig::default()));
        let services = TaskServices::detached().with_watchdog(Arc::clone(&watchdog));

        services.register("fault_monitor", Duration::from_millis(100));
        let health = watchdog.task_health("fault_monitor");
        assert_eq!(health.map(|h| h.timeout), Some(Duration::from_millis(400)));

        services.unregister("fault_monitor");
        assert_eq!(watchdog.task_count(), 0);
    }
}
