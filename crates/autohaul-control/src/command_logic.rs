//! Mode arbitration, fault latching and actuator output.
//!
//! Each cycle runs four steps in a fixed order:
//!
//! 1. latch a fault if the newest reading shows one (this also cancels a
//!    pending rearm)
//! 2. clear the fault if it was rearmed on an earlier cycle and the reading
//!    is now clean
//! 3. apply the operator command latched since the last cycle
//! 4. compute the output: stopped while faulted, the navigation request in
//!    automatic mode, and the operator's accelerate and accumulated steering
//!    in manual mode
//!
//! Every output passes through [`ActuatorCommand::clamped`] before it is
//! stored, so no getter ever returns an out-of-range value.

use autohaul_channel::SharedSensorChannel;
use autohaul_scheduler::{PeriodicTaskConfig, TaskPriority};
use autohaul_types::{
    ActuatorCommand, OperatorCommand, SensorReading, TruckState, clamp_steering, clamp_velocity,
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use crate::config::{CommandLogicConfig, FaultThresholds};
use crate::error::ControlResult;
use crate::navigation::NavigationControl;
use crate::services::{TaskServices, TaskSlot};

/// Task name used for scheduling, heartbeats and timing.
pub const COMMAND_LOGIC_TASK: &str = "command_logic";

/// Everything command logic owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandState {
    /// Authoritative truck state.
    pub truck: TruckState,
    /// Operator acknowledged the fault; cleared on the next clean cycle.
    pub rearmed: bool,
    /// Command waiting for the next cycle.
    pub pending: Option<OperatorCommand>,
    /// Last navigation request.
    pub navigation_output: ActuatorCommand,
    /// Last computed output.
    pub output: ActuatorCommand,
    /// Reading used by the last cycle.
    pub latest_reading: SensorReading,
}

/// State transitions taken during one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleEvents {
    /// A fault was latched this cycle.
    pub fault_latched: bool,
    /// A rearmed fault was cleared this cycle.
    pub fault_cleared: bool,
    /// Automatic mode was requested while faulted.
    pub automatic_rejected: bool,
    /// Mode switched; `Some(true)` for automatic.
    pub mode_changed: Option<bool>,
    /// A rearm was accepted.
    pub rearm_accepted: bool,
}

impl CommandState {
    /// Latch an operator command, replacing any unconsumed one.
    pub fn latch(&mut self, command: OperatorCommand) {
        self.pending = Some(command);
    }

    /// Run one cycle against `reading`.
    pub fn step(&mut self, reading: SensorReading, thresholds: &FaultThresholds) -> CycleEvents {
        let mut events = CycleEvents::default();
        let command = self.pending.take().unwrap_or_default();
        self.latest_reading = reading;

        if reading.has_fault_condition(thresholds.critical_temp_c) {
            events.fault_latched = !self.truck.fault;
            self.truck.fault = true;
            self.rearmed = false;
        } else if self.truck.fault && self.rearmed {
            self.truck.fault = false;
            self.rearmed = false;
            events.fault_cleared = true;
        }

        if command.auto_mode && !self.truck.automatic {
            if self.truck.fault {
                events.automatic_rejected = true;
            } else {
                self.truck.automatic = true;
                events.mode_changed = Some(true);
            }
        }
        if command.manual_mode && self.truck.automatic {
            self.truck.automatic = false;
            events.mode_changed = Some(false);
        }
        if command.rearm && self.truck.fault {
            self.rearmed = true;
            events.rearm_accepted = true;
        }

        self.output = if self.truck.fault {
            ActuatorCommand::stopped()
        } else if self.truck.automatic {
            self.navigation_output.clamped()
        } else {
            ActuatorCommand {
                velocity: clamp_velocity(command.accelerate),
                steering: clamp_steering(
                    self.output.steering.saturating_add(command.steering_delta()),
                ),
                arrived: false,
            }
        };
        events
    }
}

/// Command arbitration loop.
pub struct CommandLogic {
    channel: Arc<SharedSensorChannel>,
    thresholds: FaultThresholds,
    config: CommandLogicConfig,
    navigation: Option<Arc<NavigationControl>>,
    state: Mutex<CommandState>,
    services: TaskServices,
    task: TaskSlot,
}

impl CommandLogic {
    /// Create command logic reading from `channel`.
    ///
    /// With `navigation` attached, each cycle pulls its output before taking
    /// the command lock and pushes the new truck state after releasing it.
    #[must_use]
    pub fn new(
        channel: Arc<SharedSensorChannel>,
        thresholds: FaultThresholds,
        config: CommandLogicConfig,
        navigation: Option<Arc<NavigationControl>>,
        services: TaskServices,
    ) -> Self {
        Self {
            channel,
            thresholds,
            config,
            navigation,
            state: Mutex::new(CommandState::default()),
            services,
            task: TaskSlot::default(),
        }
    }

    /// Latch an operator command for the next cycle.
    pub fn set_command(&self, command: OperatorCommand) {
        self.state.lock().latch(command);
    }

    /// Authoritative truck state.
    #[must_use]
    pub fn get_state(&self) -> TruckState {
        self.state.lock().truck
    }

    /// Latest actuator output.
    #[must_use]
    pub fn get_actuator_output(&self) -> ActuatorCommand {
        self.state.lock().output
    }

    /// Reading used by the last cycle.
    #[must_use]
    pub fn get_latest_sensor_data(&self) -> SensorReading {
        self.state.lock().latest_reading
    }

    /// Store a navigation request for use in automatic mode.
    pub fn set_navigation_output(&self, output: ActuatorCommand) {
        self.state.lock().navigation_output = output;
    }

    /// Run one cycle against the newest reading.
    pub fn run_cycle(&self) -> CycleEvents {
        let reading = self.channel.peek_latest();
        let navigation_output = self.navigation.as_ref().map(|nav| nav.get_output());

        let (events, truck, output) = {
            let mut state = self.state.lock();
            if let Some(output) = navigation_output {
                state.navigation_output = output;
            }
            let events = state.step(reading, &self.thresholds);
            (events, state.truck, state.output)
        };

        if let Some(navigation) = &self.navigation {
            navigation.set_truck_state(truck);
        }
        log_events(&events, &reading, truck, output);
        events
    }

    /// Start the command loop at high priority.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop is already running or could not be spawned.
    pub fn start(self: &Arc<Self>) -> ControlResult<()> {
        self.task.start(
            self,
            &self.services,
            PeriodicTaskConfig::new(COMMAND_LOGIC_TASK, self.config.period(), TaskPriority::High),
            |logic| {
                let _events = logic.run_cycle();
            },
        )?;
        tracing::info!(period_ms = self.config.period_ms, "Command logic started");
        Ok(())
    }

    /// Stop the command loop.
    pub fn stop(&self) {
        if self.task.stop(&self.services) {
            tracing::info!(state = %self.get_state(), "Command logic stopped");
        }
    }

    /// Returns true while the loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.is_running()
    }
}

impl Drop for CommandLogic {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for CommandLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandLogic")
            .field("thresholds", &self.thresholds)
            .field("state", &*self.state.lock())
            .field("navigation", &self.navigation.is_some())
            .finish_non_exhaustive()
    }
}

fn log_events(
    events: &CycleEvents,
    reading: &SensorReading,
    truck: TruckState,
    output: ActuatorCommand,
) {
    if events.fault_latched {
        tracing::error!(
            temperature_c = reading.temperature_c,
            electrical = reading.electrical_fault,
            hydraulic = reading.hydraulic_fault,
            "Fault latched, actuators stopped"
        );
    }
    if events.fault_cleared {
        tracing::info!(state = %truck, "Fault cleared after rearm");
    }
    if events.automatic_rejected {
        tracing::warn!("Automatic mode rejected while faulted");
    }
    match events.mode_changed {
        Some(true) => tracing::info!("Mode changed to automatic"),
        Some(false) => tracing::info!("Mode changed to manual"),
        None => {}
    }
    if events.rearm_accepted {
        tracing::info!("Rearm acknowledged");
    }
    tracing::trace!(
        velocity = output.velocity,
        steering = output.steering,
        state = %truck,
        "Command cycle"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use autohaul_test_helpers::prelude::*;
    use tracing_test::traced_test;

    fn logic() -> (Arc<SharedSensorChannel>, CommandLogic) {
        let channel = Arc::new(SharedSensorChannel::new());
        let logic = CommandLogic::new(
            Arc::clone(&channel),
            FaultThresholds::default(),
            CommandLogicConfig::default(),
            None,
            TaskServices::detached(),
        );
        (channel, logic)
    }

    #[test]
    fn test_starts_manual_and_healthy() {
        let (_channel, logic) = logic();
        assert_eq!(logic.get_state(), TruckState::default());
        assert_eq!(logic.get_actuator_output(), ActuatorCommand::stopped());
    }

    #[test]
    fn test_manual_drive_clamps_velocity() {
        let (_channel, logic) = logic();
        logic.set_command(OperatorCommand::drive(250, 0, 0));
        let _events = logic.run_cycle();
        assert_eq!(logic.get_actuator_output().velocity, 100);
    }

    #[test]
    fn test_command_is_consumed_once() {
        let (_channel, logic) = logic();
        logic.set_command(OperatorCommand::drive(40, 10, 0));
        let _events = logic.run_cycle();
        assert_eq!(logic.get_actuator_output(), ActuatorCommand::new(40, 10));

        let _events = logic.run_cycle();
        assert_eq!(logic.get_actuator_output(), ActuatorCommand::new(0, 10));
    }

    #[test]
    fn test_later_command_replaces_unconsumed_one() {
        let (_channel, logic) = logic();
        logic.set_command(OperatorCommand::drive(40, 0, 0));
        logic.set_command(OperatorCommand::drive(-20, 0, 0));
        let _events = logic.run_cycle();
        assert_eq!(logic.get_actuator_output().velocity, -20);
    }

    #[traced_test]
    #[test]
    fn test_fault_latches_and_stops() {
        let (channel, logic) = logic();
        logic.set_command(OperatorCommand::drive(50, 0, 0));
        let _events = logic.run_cycle();

        channel.write(ReadingBuilder::new().electrical_fault().build());
        logic.set_command(OperatorCommand::drive(50, 0, 0));
        let events = logic.run_cycle();

        assert!(events.fault_latched);
        assert!(logic.get_state().fault);
        assert_eq!(logic.get_actuator_output(), ActuatorCommand::stopped());
        assert!(logs_contain("Fault latched"));

        let events = logic.run_cycle();
        assert!(!events.fault_latched);
    }

    #[traced_test]
    #[test]
    fn test_automatic_rejected_while_faulted() {
        let (channel, logic) = logic();
        channel.write(ReadingBuilder::new().temperature_c(125).build());
        logic.set_command(OperatorCommand::automatic());
        let events = logic.run_cycle();

        assert!(events.automatic_rejected);
        assert!(!logic.get_state().automatic);
        assert!(logs_contain("Automatic mode rejected while faulted"));
    }

    #[test]
    fn test_rearm_clears_on_following_clean_cycle() {
        let (channel, logic) = logic();
        channel.write(ReadingBuilder::new().hydraulic_fault().build());
        let _events = logic.run_cycle();

        channel.write(ReadingBuilder::new().build());
        logic.set_command(OperatorCommand::rearm());
        let events = logic.run_cycle();
        assert!(events.rearm_accepted);
        assert!(logic.get_state().fault);

        let events = logic.run_cycle();
        assert!(events.fault_cleared);
        assert!(!logic.get_state().fault);
    }

    #[test]
    fn test_rearm_cancelled_by_persisting_fault() {
        let (channel, logic) = logic();
        channel.write(ReadingBuilder::new().temperature_c(130).build());
        logic.set_command(OperatorCommand::rearm());
        let _events = logic.run_cycle();
        let _events = logic.run_cycle();

        channel.write(ReadingBuilder::new().temperature_c(80).build());
        let _events = logic.run_cycle();
        assert!(logic.get_state().fault);
    }

    #[test]
    fn test_rearm_ignored_without_fault() {
        let (_channel, logic) = logic();
        logic.set_command(OperatorCommand::rearm());
        let events = logic.run_cycle();
        assert!(!events.rearm_accepted);
    }

    #[test]
    fn test_automatic_mode_forwards_clamped_navigation_output() {
        let (_channel, logic) = logic();
        logic.set_command(OperatorCommand::automatic());
        let events = logic.run_cycle();
        assert_eq!(events.mode_changed, Some(true));

        logic.set_navigation_output(ActuatorCommand {
            velocity: 300,
            steering: -500,
            arrived: false,
        });
        let _events = logic.run_cycle();
        assert_eq!(logic.get_actuator_output(), ActuatorCommand::new(100, -180));
    }

    #[test]
    fn test_manual_request_leaves_automatic() {
        let (_channel, logic) = logic();
        logic.set_command(OperatorCommand::automatic());
        let _events = logic.run_cycle();
        logic.set_command(OperatorCommand::manual());
        let events = logic.run_cycle();
        assert_eq!(events.mode_changed, Some(false));
        assert!(!logic.get_state().automatic);
    }

    #[test]
    fn test_latest_sensor_data_is_cycle_reading() {
        let (channel, logic) = logic();
        let reading = ReadingBuilder::new().position(7, 8).timestamp_ms(42).build();
        channel.write(reading);
        assert_eq!(logic.get_latest_sensor_data(), SensorReading::default());
        let _events = logic.run_cycle();
        assert_eq!(logic.get_latest_sensor_data(), reading);
    }
}
