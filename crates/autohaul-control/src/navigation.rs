//! Rotate-then-move guidance towards a setpoint.
//!
//! The controller is a three-state machine:
//!
//! - `Rotating`: turn on the spot towards the target bearing
//! - `Moving`: drive straight at cruise speed while roughly aligned
//! - `Arrived`: hold still until a setpoint with a new position arrives
//!
//! Moving falls back to rotating only when the heading error grows past
//! twice the alignment threshold, which keeps the two states from chattering.
//!
//! Whenever the truck is not in automatic mode, or a fault is latched, the
//! setpoint tracks the truck's own position and the output stays at zero.
//! Switching into automatic mode therefore starts from "already there"
//! instead of lurching towards a stale target.

use autohaul_channel::SharedSensorChannel;
use autohaul_scheduler::{PeriodicTaskConfig, TaskPriority};
use autohaul_types::{ActuatorCommand, NavigationSetpoint, SensorReading, TruckState};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::config::NavigationConfig;
use crate::error::ControlResult;
use crate::services::{TaskServices, TaskSlot};

/// Task name used for scheduling, heartbeats and timing.
pub const NAVIGATION_TASK: &str = "navigation";

/// Navigation state machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum NavMode {
    /// Turning on the spot towards the target.
    #[default]
    Rotating,
    /// Driving towards the target.
    Moving,
    /// Within the arrival radius of the current target.
    Arrived,
}

impl fmt::Display for NavMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rotating => write!(f, "rotating"),
            Self::Moving => write!(f, "moving"),
            Self::Arrived => write!(f, "arrived"),
        }
    }
}

/// Bearing from `from` to `to` in degrees, `[0, 360)`, counter-clockwise from +X.
#[must_use]
pub fn bearing_deg(from: (i32, i32), to: (i32, i32)) -> f64 {
    let dx = f64::from(to.0) - f64::from(from.0);
    let dy = f64::from(to.1) - f64::from(from.1);
    dy.atan2(dx).to_degrees().rem_euclid(360.0)
}

/// Signed difference `target - current` wrapped into `(-180, 180]`.
///
/// Positive means the target lies to the left (counter-clockwise).
#[must_use]
pub fn heading_error_deg(target: f64, current: f64) -> f64 {
    let error = (target - current).rem_euclid(360.0);
    if error > 180.0 { error - 360.0 } else { error }
}

/// Euclidean distance between two positions.
#[must_use]
pub fn distance(from: (i32, i32), to: (i32, i32)) -> f64 {
    let dx = f64::from(to.0) - f64::from(from.0);
    let dy = f64::from(to.1) - f64::from(from.1);
    dx.hypot(dy)
}

/// Mutable navigation state; advanced by [`NavState::step`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NavState {
    /// Latest truck state pushed by command logic.
    pub truck: TruckState,
    /// Current target.
    pub setpoint: NavigationSetpoint,
    /// State machine position.
    pub mode: NavMode,
    /// Last computed output.
    pub output: ActuatorCommand,
}

/// What happened during one navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavStep {
    /// The setpoint was reset to the current position.
    pub reset: bool,
    /// The target was reached this step.
    pub arrived: bool,
    /// Mode before the step.
    pub previous_mode: NavMode,
}

impl NavState {
    /// Replace the setpoint. A new target position restarts the approach.
    ///
    /// Returns true when the position changed.
    pub fn set_setpoint(&mut self, setpoint: NavigationSetpoint) -> bool {
        let is_new = setpoint.is_new_target(&self.setpoint);
        self.setpoint = setpoint;
        if is_new {
            self.mode = NavMode::Rotating;
            self.output.arrived = false;
        }
        is_new
    }

    /// Advance the state machine with `reading`.
    ///
    /// The returned output of a cycle that changes mode already belongs to
    /// the new mode.
    pub fn step(&mut self, reading: &SensorReading, config: &NavigationConfig) -> NavStep {
        let mut step = NavStep {
            previous_mode: self.mode,
            ..NavStep::default()
        };

        if !self.truck.navigation_enabled() {
            self.setpoint.target_x = reading.position_x;
            self.setpoint.target_y = reading.position_y;
            self.setpoint.target_angle = reading.heading_deg;
            self.mode = NavMode::Rotating;
            self.output = ActuatorCommand::stopped();
            step.reset = true;
            return step;
        }

        if self.mode == NavMode::Arrived {
            self.output = arrived_output();
            return step;
        }

        let position = reading.position();
        let target = (self.setpoint.target_x, self.setpoint.target_y);
        if distance(position, target) <= config.arrival_radius {
            self.mode = NavMode::Arrived;
            self.output = arrived_output();
            step.arrived = true;
            return step;
        }

        let error = heading_error_deg(
            bearing_deg(position, target),
            f64::from(reading.heading_deg),
        );
        self.mode = match self.mode {
            NavMode::Rotating if error.abs() <= config.alignment_threshold_deg => NavMode::Moving,
            NavMode::Moving if error.abs() > config.realignment_threshold_deg() => {
                NavMode::Rotating
            }
            mode => mode,
        };

        self.output = match self.mode {
            NavMode::Moving => ActuatorCommand::new(config.cruise_speed, 0),
            _ => {
                let steering = if error >= 0.0 {
                    config.rotation_rate
                } else {
                    -config.rotation_rate
                };
                ActuatorCommand::new(0, steering)
            }
        };
        step
    }
}

fn arrived_output() -> ActuatorCommand {
    ActuatorCommand {
        arrived: true,
        ..ActuatorCommand::stopped()
    }
}

/// Navigation loop: turns setpoints and readings into actuator requests.
pub struct NavigationControl {
    channel: Arc<SharedSensorChannel>,
    config: NavigationConfig,
    state: Mutex<NavState>,
    services: TaskServices,
    task: TaskSlot,
}

impl NavigationControl {
    /// Create a navigation controller reading from `channel`.
    #[must_use]
    pub fn new(
        channel: Arc<SharedSensorChannel>,
        config: NavigationConfig,
        services: TaskServices,
    ) -> Self {
        Self {
            channel,
            config,
            state: Mutex::new(NavState::default()),
            services,
            task: TaskSlot::default(),
        }
    }

    /// Guidance parameters.
    #[must_use]
    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// Replace the setpoint.
    pub fn set_setpoint(&self, setpoint: NavigationSetpoint) {
        let is_new = self.state.lock().set_setpoint(setpoint);
        if is_new {
            tracing::info!(
                target_x = setpoint.target_x,
                target_y = setpoint.target_y,
                "New navigation target"
            );
        }
    }

    /// Current setpoint.
    #[must_use]
    pub fn setpoint(&self) -> NavigationSetpoint {
        self.state.lock().setpoint
    }

    /// Push the authoritative truck state. Called by command logic each cycle.
    pub fn set_truck_state(&self, truck: TruckState) {
        self.state.lock().truck = truck;
    }

    /// Latest requested output.
    #[must_use]
    pub fn get_output(&self) -> ActuatorCommand {
        self.state.lock().output
    }

    /// Current state machine position.
    #[must_use]
    pub fn nav_state(&self) -> NavMode {
        self.state.lock().mode
    }

    /// Run one navigation cycle against the newest reading.
    pub fn run_cycle(&self) -> ActuatorCommand {
        let reading = self.channel.peek_latest();
        let (step, mode, output, setpoint) = {
            let mut state = self.state.lock();
            let step = state.step(&reading, &self.config);
            (step, state.mode, state.output, state.setpoint)
        };

        if step.arrived {
            tracing::info!(
                x = reading.position_x,
                y = reading.position_y,
                target_x = setpoint.target_x,
                target_y = setpoint.target_y,
                "Arrived at navigation target"
            );
        } else if mode != step.previous_mode && !step.reset {
            tracing::debug!(from = %step.previous_mode, to = %mode, "Navigation mode change");
        }
        output
    }

    /// Start the navigation loop at medium priority.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop is already running or could not be spawned.
    pub fn start(self: &Arc<Self>) -> ControlResult<()> {
        self.task.start(
            self,
            &self.services,
            PeriodicTaskConfig::new(NAVIGATION_TASK, self.config.period(), TaskPriority::Medium),
            |navigation| {
                let _output = navigation.run_cycle();
            },
        )?;
        tracing::info!(period_ms = self.config.period_ms, "Navigation started");
        Ok(())
    }

    /// Stop the navigation loop.
    pub fn stop(&self) {
        if self.task.stop(&self.services) {
            tracing::info!("Navigation stopped");
        }
    }

    /// Returns true while the loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.is_running()
    }
}

impl Drop for NavigationControl {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for NavigationControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationControl")
            .field("config", &self.config)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autohaul_test_helpers::prelude::*;
    use tracing_test::traced_test;

    const AUTO: TruckState = TruckState {
        fault: false,
        automatic: true,
    };

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn navigation() -> (Arc<SharedSensorChannel>, NavigationControl) {
        let channel = Arc::new(SharedSensorChannel::new());
        let nav = NavigationControl::new(
            Arc::clone(&channel),
            NavigationConfig::default(),
            TaskServices::detached(),
        );
        (channel, nav)
    }

    #[test]
    fn test_bearing_quadrants() {
        assert!(approx(bearing_deg((0, 0), (10, 0)), 0.0));
        assert!(approx(bearing_deg((0, 0), (0, 10)), 90.0));
        assert!(approx(bearing_deg((0, 0), (-10, 0)), 180.0));
        assert!(approx(bearing_deg((0, 0), (0, -10)), 270.0));
    }

    #[test]
    fn test_heading_error_wraps() {
        assert!(approx(heading_error_deg(10.0, 350.0), 20.0));
        assert!(approx(heading_error_deg(350.0, 10.0), -20.0));
        assert!(approx(heading_error_deg(180.0, 0.0), 180.0));
        assert!(approx(heading_error_deg(0.0, 180.0), 180.0));
    }

    #[test]
    fn test_disabled_navigation_tracks_position() {
        let (channel, nav) = navigation();
        nav.set_setpoint(NavigationSetpoint::at(500, 500));
        channel.write(ReadingBuilder::new().position(12, -3).heading(45).build());

        let output = nav.run_cycle();
        assert_eq!(output, ActuatorCommand::stopped());
        let setpoint = nav.setpoint();
        assert_eq!((setpoint.target_x, setpoint.target_y), (12, -3));
        assert_eq!(setpoint.target_angle, 45);
        assert_eq!(nav.nav_state(), NavMode::Rotating);
    }

    #[test]
    fn test_fault_forces_reset_even_in_automatic() {
        let (channel, nav) = navigation();
        nav.set_truck_state(TruckState {
            fault: true,
            automatic: true,
        });
        nav.set_setpoint(NavigationSetpoint::at(100, 0));
        channel.write(ReadingBuilder::new().build());

        assert_eq!(nav.run_cycle(), ActuatorCommand::stopped());
        assert_eq!(nav.setpoint().target_x, 0);
    }

    #[test]
    fn test_rotates_towards_left_target() {
        let (channel, nav) = navigation();
        nav.set_truck_state(AUTO);
        nav.set_setpoint(NavigationSetpoint::at(0, 100));
        channel.write(ReadingBuilder::new().heading(0).build());

        let output = nav.run_cycle();
        assert_eq!(output.velocity, 0);
        assert_eq!(output.steering, 40);
        assert_eq!(nav.nav_state(), NavMode::Rotating);
    }

    #[test]
    fn test_rotates_towards_right_target() {
        let (channel, nav) = navigation();
        nav.set_truck_state(AUTO);
        nav.set_setpoint(NavigationSetpoint::at(0, -100));
        channel.write(ReadingBuilder::new().heading(0).build());

        assert_eq!(nav.run_cycle().steering, -40);
    }

    #[test]
    fn test_aligned_cycle_emits_moving_output() {
        let (channel, nav) = navigation();
        nav.set_truck_state(AUTO);
        nav.set_setpoint(NavigationSetpoint::at(100, 0));
        channel.write(ReadingBuilder::new().heading(3).build());

        let output = nav.run_cycle();
        assert_eq!(nav.nav_state(), NavMode::Moving);
        assert_eq!(output, ActuatorCommand::new(30, 0));
    }

    #[test]
    fn test_moving_tolerates_error_inside_hysteresis_band() {
        let (channel, nav) = navigation();
        nav.set_truck_state(AUTO);
        nav.set_setpoint(NavigationSetpoint::at(100, 0));
        channel.write(ReadingBuilder::new().heading(0).build());
        let _output = nav.run_cycle();
        assert_eq!(nav.nav_state(), NavMode::Moving);

        channel.write(ReadingBuilder::new().heading(8).build());
        assert_eq!(nav.run_cycle().velocity, 30);
        assert_eq!(nav.nav_state(), NavMode::Moving);

        channel.write(ReadingBuilder::new().heading(15).build());
        let output = nav.run_cycle();
        assert_eq!(nav.nav_state(), NavMode::Rotating);
        assert_eq!(output, ActuatorCommand::new(0, -40));
    }

    #[traced_test]
    #[test]
    fn test_arrival_latches_until_new_target() {
        let (channel, nav) = navigation();
        nav.set_truck_state(AUTO);
        nav.set_setpoint(NavigationSetpoint::at(3, 4));
        channel.write(ReadingBuilder::new().build());

        let output = nav.run_cycle();
        assert!(output.arrived);
        assert_eq!((output.velocity, output.steering), (0, 0));
        assert!(logs_contain("Arrived at navigation target"));

        channel.write(ReadingBuilder::new().position(-50, 0).build());
        assert!(nav.run_cycle().arrived);

        nav.set_setpoint(NavigationSetpoint {
            target_speed: 80,
            ..nav.setpoint()
        });
        assert_eq!(nav.nav_state(), NavMode::Arrived);

        nav.set_setpoint(NavigationSetpoint::at(200, 0));
        assert_eq!(nav.nav_state(), NavMode::Rotating);
        assert!(!nav.get_output().arrived);
    }

    #[test]
    fn test_enabling_automatic_starts_arrived() {
        let (channel, nav) = navigation();
        channel.write(ReadingBuilder::new().position(40, 40).build());
        let _output = nav.run_cycle();

        nav.set_truck_state(AUTO);
        assert!(nav.run_cycle().arrived);
    }
}
