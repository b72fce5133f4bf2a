//! Heartbeat registry and check loop.

use autohaul_scheduler::{PeriodicTask, PeriodicTaskConfig, PriorityElevator, TaskPriority};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::{WatchdogError, WatchdogResult};
use crate::health::TaskHealthRecord;

/// Callback invoked with `(task_name, elapsed_since_last_heartbeat)` on a stall.
pub type FaultHandler = Arc<dyn Fn(&str, Duration) + Send + Sync>;

/// Name of the check loop thread.
const CHECK_TASK_NAME: &str = "watchdog";

/// Heartbeats between debug traces for one task.
const HEARTBEAT_TRACE_INTERVAL: u64 = 100;

/// Watchdog configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Period of the check loop (milliseconds).
    pub check_period_ms: u64,
    /// Task timeout as a multiple of the task's period.
    pub timeout_multiplier: u32,
    /// Lower bound on any derived task timeout (milliseconds).
    pub min_timeout_ms: u64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            check_period_ms: 100,
            timeout_multiplier: 4,
            min_timeout_ms: 200,
        }
    }
}

impl WatchdogConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> WatchdogResult<()> {
        if self.check_period_ms == 0 {
            return Err(WatchdogError::invalid_configuration(
                "check_period_ms must be greater than 0",
            ));
        }
        if self.timeout_multiplier == 0 {
            return Err(WatchdogError::invalid_configuration(
                "timeout_multiplier must be greater than 0",
            ));
        }
        if self.min_timeout_ms < self.check_period_ms {
            return Err(WatchdogError::invalid_configuration(
                "min_timeout_ms must be at least check_period_ms",
            ));
        }
        Ok(())
    }

    /// Check loop period.
    #[must_use]
    pub fn check_period(&self) -> Duration {
        Duration::from_millis(self.check_period_ms)
    }

    /// Timeout for a task running at `period`.
    #[must_use]
    pub fn timeout_for(&self, period: Duration) -> Duration {
        period
            .saturating_mul(self.timeout_multiplier)
            .max(Duration::from_millis(self.min_timeout_ms))
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> WatchdogConfigBuilder {
        WatchdogConfigBuilder::default()
    }
}

/// Builder for `WatchdogConfig`.
#[derive(Debug, Default)]
pub struct WatchdogConfigBuilder {
    config: WatchdogConfig,
}

impl WatchdogConfigBuilder {
    /// Set the check loop period in milliseconds.
    #[must_use]
    pub fn check_period_ms(mut self, ms: u64) -> Self {
        self.config.check_period_ms = ms;
        self
    }

    /// Set the timeout multiplier.
    #[must_use]
    pub fn timeout_multiplier(mut self, multiplier: u32) -> Self {
        self.config.timeout_multiplier = multiplier;
        self
    }

    /// Set the minimum derived timeout in milliseconds.
    #[must_use]
    pub fn min_timeout_ms(mut self, ms: u64) -> Self {
        self.config.min_timeout_ms = ms;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> WatchdogResult<WatchdogConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn default_fault_handler() -> FaultHandler {
    Arc::new(|task: &str, elapsed: Duration| {
        tracing::error!(
            task = task,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Watchdog detected stalled task"
        );
    })
}

/// Heartbeat registry shared by every periodic task.
///
/// One instance is created at startup and handed to each task by
/// reference. Registry operations take a short exclusive lock; the fault
/// handler is always invoked after that lock is released.
pub struct Watchdog {
    config: WatchdogConfig,
    tasks: Mutex<HashMap<String, TaskHealthRecord>>,
    fault_handler: RwLock<FaultHandler>,
    fault_count: AtomicU64,
    check_loop: Mutex<Option<PeriodicTask>>,
}

impl std::fmt::Debug for Watchdog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watchdog")
            .field("config", &self.config)
            .field("task_count", &self.task_count())
            .field("fault_count", &self.fault_count())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(WatchdogConfig::default())
    }
}

impl Watchdog {
    /// Create a watchdog with the default fault handler, which logs an error.
    #[must_use]
    pub fn new(config: WatchdogConfig) -> Self {
        Self {
            config,
            tasks: Mutex::new(HashMap::new()),
            fault_handler: RwLock::new(default_fault_handler()),
            fault_count: AtomicU64::new(0),
            check_loop: Mutex::new(None),
        }
    }

    /// Watchdog configuration.
    #[must_use]
    pub fn config(&self) -> &WatchdogConfig {
        &self.config
    }

    /// Register `task` with `timeout`, replacing any existing record.
    pub fn register_task(&self, task: &str, timeout: Duration) {
        self.tasks
            .lock()
            .insert(task.to_string(), TaskHealthRecord::new(timeout, Instant::now()));

        tracing::info!(
            task = task,
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            "Watchdog task registered"
        );
    }

    /// Remove `task` from the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the task was not registered.
    pub fn unregister_task(&self, task: &str) -> WatchdogResult<()> {
        if self.tasks.lock().remove(task).is_none() {
            return Err(WatchdogError::task_not_found(task));
        }
        tracing::info!(task = task, "Watchdog task unregistered");
        Ok(())
    }

    /// Record a heartbeat for `task`.
    ///
    /// Unknown names are logged as a warning and otherwise ignored.
    pub fn heartbeat(&self, task: &str) {
        let heartbeats = self.tasks.lock().get_mut(task).map(|record| {
            record.heartbeat(Instant::now());
            record.heartbeats
        });
        let Some(heartbeats) = heartbeats else {
            tracing::warn!(task = task, "Heartbeat from unregistered task");
            return;
        };

        if heartbeats % HEARTBEAT_TRACE_INTERVAL == 0 {
            tracing::debug!(task = task, heartbeats = heartbeats, "Watchdog heartbeat");
        }
    }

    /// Replace the fault handler.
    pub fn set_fault_handler<F>(&self, handler: F)
    where
        F: Fn(&str, Duration) + Send + Sync + 'static,
    {
        *self.fault_handler.write() = Arc::new(handler);
    }

    /// Run one check pass against the current time.
    ///
    /// Returns the names of tasks flagged in this pass.
    pub fn check_tasks(&self) -> Vec<String> {
        self.check_tasks_at(Instant::now())
    }

    /// Run one check pass as if the current time were `now`.
    ///
    /// Each flagged task has its failure counters incremented and its last
    /// heartbeat reset to `now`, then the fault handler is called once per
    /// flagged task outside the registry lock.
    pub fn check_tasks_at(&self, now: Instant) -> Vec<String> {
        let stalled: Vec<(String, Duration)> = {
            let mut tasks = self.tasks.lock();
            tasks
                .iter_mut()
                .filter_map(|(name, record)| {
                    let elapsed = record.timed_out(now)?;
                    record.record_stall(now);
                    Some((name.clone(), elapsed))
                })
                .collect()
        };

        if stalled.is_empty() {
            return Vec::new();
        }

        let handler = Arc::clone(&*self.fault_handler.read());
        stalled
            .into_iter()
            .map(|(name, elapsed)| {
                let total = self.fault_count.fetch_add(1, Ordering::SeqCst) + 1;
                tracing::debug!(task = %name, total_faults = total, "Watchdog fault recorded");
                handler(&name, elapsed);
                name
            })
            .collect()
    }

    /// Start the check loop on its own thread.
    ///
    /// The loop holds only a weak reference, so dropping the last `Arc`
    /// still tears the watchdog down.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop is already running or the thread could not start.
    pub fn start(self: &Arc<Self>, elevator: Arc<dyn PriorityElevator>) -> WatchdogResult<()> {
        let mut check_loop = self.check_loop.lock();
        if check_loop.is_some() {
            return Err(WatchdogError::AlreadyRunning);
        }

        let weak = Arc::downgrade(self);
        let task = PeriodicTask::spawn(
            PeriodicTaskConfig::new(
                CHECK_TASK_NAME,
                self.config.check_period(),
                TaskPriority::Highest,
            ),
            elevator,
            move || {
                if let Some(watchdog) = weak.upgrade() {
                    let _stalled = watchdog.check_tasks();
                }
            },
        )?;
        *check_loop = Some(task);

        tracing::info!(
            check_period_ms = self.config.check_period_ms,
            "Watchdog started"
        );
        Ok(())
    }

    /// Stop the check loop. Does nothing if it is not running.
    pub fn stop(&self) {
        let task = self.check_loop.lock().take();
        if let Some(mut task) = task {
            task.stop();
            tracing::info!(faults_detected = self.fault_count(), "Watchdog stopped");
        }
    }

    /// Returns true while the check loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.check_loop.lock().is_some()
    }

    /// Number of registered tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Total stalls detected since creation.
    #[must_use]
    pub fn fault_count(&self) -> u64 {
        self.fault_count.load(Ordering::SeqCst)
    }

    /// Snapshot of one task's record.
    #[must_use]
    pub fn task_health(&self, task: &str) -> Option<TaskHealthRecord> {
        self.tasks.lock().get(task).copied()
    }

    /// Snapshot of every record.
    #[must_use]
    pub fn all_task_health(&self) -> HashMap<String, TaskHealthRecord> {
        self.tasks.lock().clone()
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.stop();
    }
}
