//! Wiring for the complete control core.

use autohaul_channel::SharedSensorChannel;
use autohaul_perf::PerformanceMonitor;
use autohaul_scheduler::{NoopElevator, PriorityElevator, SchedError, native_elevator};
use autohaul_types::{
    ActuatorCommand, FaultKind, NavigationSetpoint, OperatorCommand, SensorReading, TruckState,
};
use autohaul_watchdog::Watchdog;
use crossbeam::channel::{Receiver, RecvTimeoutError};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::command_logic::CommandLogic;
use crate::config::ControlConfig;
use crate::error::{ControlError, ControlResult};
use crate::fault_monitor::{FaultEvent, FaultMonitor};
use crate::navigation::{NavMode, NavigationControl};
use crate::services::TaskServices;

/// Poll interval of the fault event log worker.
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The sensor channel, three control loops and their monitors.
///
/// Loops start in dependency order (watchdog, fault monitor, navigation,
/// command logic) and stop in reverse.
pub struct ControlSystem {
    config: ControlConfig,
    channel: Arc<SharedSensorChannel>,
    watchdog: Arc<Watchdog>,
    performance: Arc<PerformanceMonitor>,
    elevator: Arc<dyn PriorityElevator>,
    fault_monitor: Arc<FaultMonitor>,
    navigation: Arc<NavigationControl>,
    command_logic: Arc<CommandLogic>,
    event_log: Mutex<Option<EventLogWorker>>,
}

impl ControlSystem {
    /// Build the control core from a validated configuration.
    ///
    /// Uses the native priority adapter when `elevate_priorities` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: ControlConfig) -> ControlResult<Self> {
        let elevator = if config.elevate_priorities {
            native_elevator()
        } else {
            Arc::new(NoopElevator)
        };
        Self::with_elevator(config, elevator)
    }

    /// Build the control core with an explicit priority adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_elevator(
        config: ControlConfig,
        elevator: Arc<dyn PriorityElevator>,
    ) -> ControlResult<Self> {
        config.validate()?;

        let channel = Arc::new(SharedSensorChannel::with_capacity(config.channel_capacity));
        let watchdog = Arc::new(Watchdog::new(config.watchdog.clone()));
        let performance = Arc::new(PerformanceMonitor::new(config.performance.clone()));
        let services = TaskServices::new(Arc::clone(&elevator))
            .with_watchdog(Arc::clone(&watchdog))
            .with_performance(Arc::clone(&performance));

        let fault_monitor = Arc::new(FaultMonitor::new(
            Arc::clone(&channel),
            config.faults,
            config.fault_monitor,
            services.clone(),
        ));
        let navigation = Arc::new(NavigationControl::new(
            Arc::clone(&channel),
            config.navigation,
            services.clone(),
        ));
        let command_logic = Arc::new(CommandLogic::new(
            Arc::clone(&channel),
            config.faults,
            config.command_logic,
            Some(Arc::clone(&navigation)),
            services,
        ));

        Ok(Self {
            config,
            channel,
            watchdog,
            performance,
            elevator,
            fault_monitor,
            navigation,
            command_logic,
            event_log: Mutex::new(None),
        })
    }

    /// Start every loop.
    ///
    /// On failure the loops already started are stopped again.
    ///
    /// # Errors
    ///
    /// Returns an error if the system is already running or a loop could not start.
    pub fn start(&self) -> ControlResult<()> {
        let mut event_log = self.event_log.lock();
        if event_log.is_some() {
            return Err(ControlError::already_running("control system"));
        }

        let started = self
            .start_loops()
            .and_then(|()| EventLogWorker::spawn(self.fault_monitor.subscribe()));
        match started {
            Ok(worker) => *event_log = Some(worker),
            Err(err) => {
                self.stop_loops();
                return Err(err);
            }
        }

        tracing::info!(
            channel_capacity = self.config.channel_capacity,
            elevate_priorities = self.config.elevate_priorities,
            "Control system started"
        );
        Ok(())
    }

    fn start_loops(&self) -> ControlResult<()> {
        self.watchdog.start(Arc::clone(&self.elevator))?;
        self.fault_monitor.start()?;
        self.navigation.start()?;
        self.command_logic.start()?;
        Ok(())
    }

    fn stop_loops(&self) {
        self.command_logic.stop();
        self.navigation.stop();
        self.fault_monitor.stop();
        self.watchdog.stop();
    }

    /// Stop every loop. Safe to call more than once.
    pub fn stop(&self) {
        let worker = self.event_log.lock().take();
        if let Some(worker) = worker {
            self.stop_loops();
            worker.stop();
            tracing::info!(
                watchdog_faults = self.watchdog.fault_count(),
                dropped_fault_events = self.fault_monitor.dropped_events(),
                "Control system stopped"
            );
        }
    }

    /// Returns true between [`start`](Self::start) and [`stop`](Self::stop).
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.event_log.lock().is_some()
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Sensor channel; the sensor producer writes here.
    #[must_use]
    pub fn channel(&self) -> &Arc<SharedSensorChannel> {
        &self.channel
    }

    /// Watchdog.
    #[must_use]
    pub fn watchdog(&self) -> &Arc<Watchdog> {
        &self.watchdog
    }

    /// Performance monitor.
    #[must_use]
    pub fn performance(&self) -> &Arc<PerformanceMonitor> {
        &self.performance
    }

    /// Fault monitor.
    #[must_use]
    pub fn fault_monitor(&self) -> &Arc<FaultMonitor> {
        &self.fault_monitor
    }

    /// Navigation controller.
    #[must_use]
    pub fn navigation(&self) -> &Arc<NavigationControl> {
        &self.navigation
    }

    /// Command logic.
    #[must_use]
    pub fn command_logic(&self) -> &Arc<CommandLogic> {
        &self.command_logic
    }

    /// Write a sensor reading.
    pub fn publish_reading(&self, reading: SensorReading) {
        self.channel.write(reading);
    }

    /// Latch an operator command.
    pub fn set_command(&self, command: OperatorCommand) {
        self.command_logic.set_command(command);
    }

    /// Replace the navigation setpoint.
    pub fn set_setpoint(&self, setpoint: NavigationSetpoint) {
        self.navigation.set_setpoint(setpoint);
    }

    /// Authoritative truck state.
    #[must_use]
    pub fn state(&self) -> TruckState {
        self.command_logic.get_state()
    }

    /// Latest actuator output.
    #[must_use]
    pub fn actuator_output(&self) -> ActuatorCommand {
        self.command_logic.get_actuator_output()
    }

    /// Latest fault classification.
    #[must_use]
    pub fn current_fault(&self) -> FaultKind {
        self.fault_monitor.get_current_fault()
    }

    /// Navigation state machine position.
    #[must_use]
    pub fn nav_state(&self) -> NavMode {
        self.navigation.nav_state()
    }

    /// Run one cycle of each loop in dependency order on the calling thread.
    ///
    /// Used for deterministic stepping when the loops are not started.
    pub fn step(&self) {
        let _event = self.fault_monitor.run_cycle();
        let _output = self.navigation.run_cycle();
        let _events = self.command_logic.run_cycle();
    }
}

impl Drop for ControlSystem {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for ControlSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlSystem")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Drains fault events into the log on a plain thread.
struct EventLogWorker {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl EventLogWorker {
    fn spawn(events: Receiver<FaultEvent>) -> ControlResult<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name("fault-events".to_string())
            .spawn(move || {
                while flag.load(Ordering::Acquire) {
                    match events.recv_timeout(EVENT_POLL_INTERVAL) {
                        Ok(event) => tracing::info!(
                            from = event.previous.code(),
                            to = event.current.code(),
                            timestamp_ms = event.reading.timestamp_ms,
                            "Fault event"
                        ),
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .map_err(|e| SchedError::spawn_failed("fault-events", e.to_string()))?;
        Ok(Self { running, handle })
    }

    fn stop(self) {
        self.running.store(false, Ordering::Release);
        if self.handle.join().is_err() {
            tracing::error!("Fault event worker panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autohaul_test_helpers::prelude::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn quiet_config() -> ControlConfig {
        ControlConfig {
            elevate_priorities: false,
            ..ControlConfig::default()
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ControlConfig {
            channel_capacity: 0,
            ..quiet_config()
        };
        assert!(matches!(
            ControlSystem::new(config),
            Err(ControlError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_step_routes_navigation_through_command_logic() -> TestResult {
        let system = ControlSystem::new(quiet_config())?;
        system.publish_reading(ReadingBuilder::new().build());
        system.set_command(OperatorCommand::automatic());
        system.step();
        assert!(system.state().automatic);

        system.set_setpoint(NavigationSetpoint::at(0, 100));
        system.step();
        system.step();
        assert_eq!(system.nav_state(), NavMode::Rotating);
        assert_eq!(system.actuator_output(), ActuatorCommand::new(0, 40));
        Ok(())
    }

    #[test]
    fn test_double_start_rejected() -> TestResult {
        let system = ControlSystem::new(quiet_config())?;
        system.start()?;
        assert!(matches!(
            system.start(),
            Err(ControlError::AlreadyRunning(_))
        ));
        system.stop();
        assert!(!system.is_running());
        assert!(!system.command_logic().is_running());
        Ok(())
    }
}
