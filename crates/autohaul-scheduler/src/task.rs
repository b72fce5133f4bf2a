//! Named periodic task threads.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::clock::DeadlineClock;
use crate::error::{SchedError, SchedResult};
use crate::priority::{PriorityElevator, TaskPriority};

/// Name, period and priority of a periodic task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicTaskConfig {
    /// Thread and log name.
    pub name: String,
    /// Loop period.
    pub period: Duration,
    /// Priority requested when the thread starts.
    pub priority: TaskPriority,
}

impl PeriodicTaskConfig {
    /// Create a task configuration.
    #[must_use]
    pub fn new(name: impl Into<String>, period: Duration, priority: TaskPriority) -> Self {
        Self {
            name: name.into(),
            period,
            priority,
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the period is zero.
    pub fn validate(&self) -> SchedResult<()> {
        if self.period.is_zero() {
            return Err(SchedError::invalid_period(&self.name, self.period));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct LoopCounters {
    cycles: AtomicU64,
    overruns: AtomicU64,
    elevated: AtomicBool,
}

/// Request `priority` for the calling thread, logging the outcome.
///
/// Returns true if the elevator granted the request. A refusal is logged as
/// a warning and is never fatal.
pub fn request_priority(elevator: &dyn PriorityElevator, task: &str, priority: TaskPriority) -> bool {
    match elevator.elevate(priority) {
        Ok(()) => {
            tracing::info!(task = task, priority = %priority, "Task priority elevated");
            true
        }
        Err(e) => {
            tracing::warn!(
                task = task,
                priority = %priority,
                error = %e,
                "Task priority elevation failed, continuing at default priority"
            );
            false
        }
    }
}

/// A dedicated thread running `body` once per period.
///
/// The running flag is checked at the top of every iteration, so
/// [`stop`](Self::stop) returns within roughly one period plus one
/// iteration's work. Dropping the task stops it.
#[derive(Debug)]
pub struct PeriodicTask {
    config: PeriodicTaskConfig,
    running: Arc<AtomicBool>,
    counters: Arc<LoopCounters>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Start a thread that runs `body` every `config.period`.
    ///
    /// # Errors
    ///
    /// Returns an error if the period is zero or the thread cannot be spawned.
    pub fn spawn<F>(
        config: PeriodicTaskConfig,
        elevator: Arc<dyn PriorityElevator>,
        mut body: F,
    ) -> SchedResult<Self>
    where
        F: FnMut() + Send + 'static,
    {
        config.validate()?;

        let running = Arc::new(AtomicBool::new(true));
        let counters = Arc::new(LoopCounters::default());

        let handle = {
            let running = Arc::clone(&running);
            let counters = Arc::clone(&counters);
            let name = config.name.clone();
            let period = config.period;
            let priority = config.priority;

            thread::Builder::new()
                .name(config.name.clone())
                .spawn(move || {
                    let elevated = request_priority(elevator.as_ref(), &name, priority);
                    counters.elevated.store(elevated, Ordering::Relaxed);

                    tracing::info!(
                        task = %name,
                        priority = %priority,
                        period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
                        "Task started"
                    );

                    let mut clock = DeadlineClock::new(period);
                    while running.load(Ordering::Acquire) {
                        body();
                        counters.cycles.fetch_add(1, Ordering::Relaxed);

                        if clock.wait().is_overrun() {
                            counters.overruns.fetch_add(1, Ordering::Relaxed);
                        }
                    }

                    tracing::info!(task = %name, "Task stopped");
                })
                .map_err(|e| SchedError::spawn_failed(&config.name, e.to_string()))?
        };

        Ok(Self {
            config,
            running,
            counters,
            handle: Some(handle),
        })
    }

    /// Task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Task configuration.
    #[must_use]
    pub fn config(&self) -> &PeriodicTaskConfig {
        &self.config
    }

    /// Returns true until [`stop`](Self::stop) is called.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Completed iterations.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.counters.cycles.load(Ordering::Relaxed)
    }

    /// Iterations that finished past their deadline.
    #[must_use]
    pub fn overruns(&self) -> u64 {
        self.counters.overruns.load(Ordering::Relaxed)
    }

    /// Returns true if the priority request was granted.
    #[must_use]
    pub fn is_elevated(&self) -> bool {
        self.counters.elevated.load(Ordering::Relaxed)
    }

    /// Clear the running flag and join the thread.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        let Some(handle) = self.handle.take() else {
            return;
        };
        // the body may drop the last owner of this task from inside the loop
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            tracing::error!(task = %self.config.name, "Task thread panicked");
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.stop();
    }
}
