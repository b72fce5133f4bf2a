//! Shared performance monitor.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::config::PerformanceConfig;
use crate::error::{PerfError, PerfResult};
use crate::report;
use crate::stats::{SampleOutcome, TaskExecutionStats};

/// Per-task execution statistics behind one lock.
///
/// Statistics are updated under the lock; log events are emitted after it
/// is released.
#[derive(Debug)]
pub struct PerformanceMonitor {
    config: PerformanceConfig,
    tasks: Mutex<BTreeMap<String, TaskExecutionStats>>,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(PerformanceConfig::default())
    }
}

impl PerformanceMonitor {
    /// Create a monitor.
    #[must_use]
    pub fn new(config: PerformanceConfig) -> Self {
        Self {
            config,
            tasks: Mutex::new(BTreeMap::new()),
        }
    }

    /// Monitor configuration.
    #[must_use]
    pub fn config(&self) -> &PerformanceConfig {
        &self.config
    }

    /// Start tracking `task`, expected to run every `expected_period`.
    ///
    /// Re-registering a task replaces its statistics.
    pub fn register_task(&self, task: &str, expected_period: Duration) {
        self.tasks.lock().insert(
            task.to_string(),
            TaskExecutionStats::new(expected_period, self.config.window),
        );
        tracing::info!(
            task = task,
            period_ms = u64::try_from(expected_period.as_millis()).unwrap_or(u64::MAX),
            "Performance monitoring registered"
        );
    }

    /// Timestamp that starts a measurement.
    #[must_use]
    pub fn start_measurement(&self) -> Instant {
        Instant::now()
    }

    /// Finish a measurement started at `start` and record it for `task`.
    pub fn end_measurement(&self, task: &str, start: Instant) -> SampleOutcome {
        self.record_execution(task, start.elapsed())
    }

    /// Record one execution of `task` that took `elapsed`.
    ///
    /// Unregistered tasks are registered on the fly with no period, which
    /// disables their deadline checks, and a warning is logged.
    pub fn record_execution(&self, task: &str, elapsed: Duration) -> SampleOutcome {
        let elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);

        let (outcome, period_us, auto_registered) = {
            let mut tasks = self.tasks.lock();
            let auto_registered = !tasks.contains_key(task);
            let stats = tasks.entry(task.to_string()).or_insert_with(|| {
                TaskExecutionStats::new(Duration::ZERO, self.config.window)
            });
            let outcome = stats.record(elapsed_us, self.config.high_utilization_ratio);
            (outcome, stats.expected_period_us, auto_registered)
        };

        if auto_registered {
            tracing::warn!(task = task, "Measured unregistered task, registered without deadline");
        }

        if let Some(overrun_us) = outcome.overrun_us {
            tracing::warn!(
                task = task,
                exec_us = elapsed_us,
                deadline_us = period_us,
                overrun_us = overrun_us,
                "Deadline miss"
            );
        }

        if let Some(utilization) = outcome.high_utilization {
            tracing::warn!(
                task = task,
                exec_us = elapsed_us,
                deadline_us = period_us,
                utilization_pct = utilization * 100.0,
                "High utilization"
            );
        }

        outcome
    }

    /// Time the rest of the current scope as one execution of `task`.
    ///
    /// ```rust
    /// use autohaul_perf::PerformanceMonitor;
    /// use std::time::Duration;
    ///
    /// let monitor = PerformanceMonitor::default();
    /// monitor.register_task("navigation", Duration::from_millis(50));
    /// {
    ///     let _guard = monitor.measure("navigation");
    ///     // one cycle of work
    /// }
    /// assert_eq!(monitor.get_stats("navigation").map(|s| s.sample_count), Some(1));
    /// ```
    #[must_use = "the measurement ends when the guard is dropped"]
    pub fn measure<'a>(&'a self, task: &'a str) -> MeasurementGuard<'a> {
        MeasurementGuard {
            monitor: self,
            task,
            start: self.start_measurement(),
        }
    }

    /// Snapshot of one task's statistics.
    #[must_use]
    pub fn get_stats(&self, task: &str) -> Option<TaskExecutionStats> {
        self.tasks.lock().get(task).cloned()
    }

    /// Snapshot of every task's statistics, ordered by name.
    #[must_use]
    pub fn get_all_stats(&self) -> BTreeMap<String, TaskExecutionStats> {
        self.tasks.lock().clone()
    }

    /// Clear the statistics of `task`, keeping its registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the task has never been registered or measured.
    pub fn reset_stats(&self, task: &str) -> PerfResult<()> {
        self.tasks
            .lock()
            .get_mut(task)
            .ok_or_else(|| PerfError::unknown_task(task))?
            .reset();
        tracing::info!(task = task, "Performance statistics reset");
        Ok(())
    }

    /// Clear every task's statistics, keeping registrations.
    pub fn reset_all_stats(&self) {
        for stats in self.tasks.lock().values_mut() {
            stats.reset();
        }
        tracing::info!("All performance statistics reset");
    }

    /// Returns true if any task has missed a deadline.
    #[must_use]
    pub fn has_deadline_violations(&self) -> bool {
        self.tasks
            .lock()
            .values()
            .any(|stats| stats.deadline_violations > 0)
    }

    /// Text table of every task's statistics.
    #[must_use]
    pub fn report(&self) -> String {
        report::render(&self.get_all_stats())
    }
}

/// Records the time between its creation and drop as one execution.
#[derive(Debug)]
pub struct MeasurementGuard<'a> {
    monitor: &'a PerformanceMonitor,
    task: &'a str,
    start: Instant,
}

impl MeasurementGuard<'_> {
    /// Time elapsed so far.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for MeasurementGuard<'_> {
    fn drop(&mut self) {
        self.monitor.end_measurement(self.task, self.start);
    }
}
