//! Edge-triggered fault classification.
//!
//! The monitor samples the newest reading each cycle, classifies it and
//! notifies listeners only when the classification changes. Two listener
//! styles are supported:
//!
//! - callbacks registered with [`FaultMonitor::register_fault_callback`],
//!   invoked synchronously on the monitor thread
//! - bounded event queues from [`FaultMonitor::subscribe`], which never
//!   block the monitor; events for a full queue are dropped and counted

use autohaul_channel::SharedSensorChannel;
use autohaul_scheduler::{PeriodicTaskConfig, TaskPriority};
use autohaul_types::{FaultKind, SensorReading};
use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::{FaultMonitorConfig, FaultThresholds};
use crate::error::ControlResult;
use crate::services::{TaskServices, TaskSlot};

/// Task name used for scheduling, heartbeats and timing.
pub const FAULT_MONITOR_TASK: &str = "fault_monitor";

/// Callback invoked with the new classification and the reading that caused it.
pub type FaultCallback = Arc<dyn Fn(FaultKind, SensorReading) + Send + Sync>;

/// A change in fault classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FaultEvent {
    /// Classification before this cycle.
    pub previous: FaultKind,
    /// Classification after this cycle.
    pub current: FaultKind,
    /// Reading that produced `current`.
    pub reading: SensorReading,
}

/// Classifies sensor readings and reports fault edges.
pub struct FaultMonitor {
    channel: Arc<SharedSensorChannel>,
    thresholds: FaultThresholds,
    config: FaultMonitorConfig,
    current: Mutex<FaultKind>,
    callbacks: RwLock<Vec<FaultCallback>>,
    subscribers: Mutex<Vec<Sender<FaultEvent>>>,
    dropped_events: AtomicU64,
    services: TaskServices,
    task: TaskSlot,
}

impl FaultMonitor {
    /// Create a monitor reading from `channel`.
    #[must_use]
    pub fn new(
        channel: Arc<SharedSensorChannel>,
        thresholds: FaultThresholds,
        config: FaultMonitorConfig,
        services: TaskServices,
    ) -> Self {
        Self {
            channel,
            thresholds,
            config,
            current: Mutex::new(FaultKind::None),
            callbacks: RwLock::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
            dropped_events: AtomicU64::new(0),
            services,
            task: TaskSlot::default(),
        }
    }

    /// Register a callback fired on every classification change.
    pub fn register_fault_callback<F>(&self, callback: F)
    where
        F: Fn(FaultKind, SensorReading) + Send + Sync + 'static,
    {
        self.callbacks.write().push(Arc::new(callback));
    }

    /// Open a bounded event queue that receives every classification change.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<FaultEvent> {
        let (sender, receiver) = channel::bounded(self.config.event_queue_capacity);
        self.subscribers.lock().push(sender);
        receiver
    }

    /// Latest classification.
    #[must_use]
    pub fn get_current_fault(&self) -> FaultKind {
        *self.current.lock()
    }

    /// Events dropped because a subscriber queue was full.
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    /// Run one monitoring cycle against the newest reading.
    ///
    /// Returns the event when the classification changed.
    pub fn run_cycle(&self) -> Option<FaultEvent> {
        let reading = self.channel.peek_latest();
        self.evaluate(reading)
    }

    /// Classify `reading` and notify listeners on a change.
    pub fn evaluate(&self, reading: SensorReading) -> Option<FaultEvent> {
        let current = FaultKind::classify(
            &reading,
            self.thresholds.critical_temp_c,
            self.thresholds.alert_temp_c,
        );

        let previous = {
            let mut state = self.current.lock();
            if *state == current {
                return None;
            }
            std::mem::replace(&mut *state, current)
        };

        let event = FaultEvent {
            previous,
            current,
            reading,
        };
        log_event(&event);
        self.notify(&event);
        Some(event)
    }

    fn notify(&self, event: &FaultEvent) {
        let callbacks = self.callbacks.read().clone();
        for callback in &callbacks {
            callback(event.current, event.reading);
        }

        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|sender| match sender.try_send(*event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
    }

    /// Start the monitor loop at the highest priority.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop is already running or could not be spawned.
    pub fn start(self: &Arc<Self>) -> ControlResult<()> {
        self.task.start(
            self,
            &self.services,
            PeriodicTaskConfig::new(
                FAULT_MONITOR_TASK,
                self.config.period(),
                TaskPriority::Highest,
            ),
            |monitor| {
                let _event = monitor.run_cycle();
            },
        )?;
        tracing::info!(period_ms = self.config.period_ms, "Fault monitor started");
        Ok(())
    }

    /// Stop the monitor loop.
    pub fn stop(&self) {
        if self.task.stop(&self.services) {
            tracing::info!(current = %self.get_current_fault(), "Fault monitor stopped");
        }
    }

    /// Returns true while the loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.is_running()
    }
}

impl Drop for FaultMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for FaultMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaultMonitor")
            .field("thresholds", &self.thresholds)
            .field("current", &self.get_current_fault())
            .field("callbacks", &self.callbacks.read().len())
            .field("dropped_events", &self.dropped_events())
            .finish_non_exhaustive()
    }
}

fn log_event(event: &FaultEvent) {
    let reading = &event.reading;
    match event.current {
        FaultKind::None => tracing::info!(
            previous = event.previous.code(),
            temperature_c = reading.temperature_c,
            "Fault condition cleared"
        ),
        FaultKind::TemperatureAlert => tracing::warn!(
            code = event.current.code(),
            temperature_c = reading.temperature_c,
            x = reading.position_x,
            y = reading.position_y,
            "Fault detected"
        ),
        FaultKind::Electrical | FaultKind::Hydraulic | FaultKind::TemperatureCritical => {
            tracing::error!(
                code = event.current.code(),
                temperature_c = reading.temperature_c,
                x = reading.position_x,
                y = reading.position_y,
                "Fault detected"
            );
        }
    }
}
