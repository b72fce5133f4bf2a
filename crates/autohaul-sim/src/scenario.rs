//! Scripted operator and route planner.

use autohaul_control::{ControlSystem, NavMode};
use autohaul_types::{FaultKind, NavigationSetpoint, OperatorCommand};
use clap::ValueEnum;
use serde::Serialize;
use std::time::Duration;

use crate::plant::TruckPlant;

/// Delay before the operator first requests automatic mode.
const ENGAGE_AFTER: Duration = Duration::from_millis(500);

/// Disturbance window of the fault scenarios.
const DISTURBANCE_START: Duration = Duration::from_secs(2);
const DISTURBANCE_END: Duration = Duration::from_secs(4);
const OVERHEAT_TEMP_C: f64 = 140.0;

/// Square route driven by every scenario.
const ROUTE: [(i32, i32); 4] = [(40, 0), (40, 40), (0, 40), (0, 0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Drive the route with no faults.
    Nominal,
    /// Overheat mid-route, rearm once cool, then resume.
    Overheat,
    /// Hydraulic fault flag mid-route, rearm once it clears, then resume.
    Hydraulic,
}

/// What the operator is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Engaging,
    Driving,
    AwaitingCooldown,
    Rearming,
    Finished,
}

/// Plays the operator and the route planner against a running system.
#[derive(Debug)]
pub struct Operator {
    scenario: Scenario,
    phase: Phase,
    waypoint: usize,
    disturbance_applied: bool,
    disturbance_cleared: bool,
    rearms: u32,
}

impl Operator {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            phase: Phase::Idle,
            waypoint: 0,
            disturbance_applied: false,
            disturbance_cleared: false,
            rearms: 0,
        }
    }

    /// Waypoints reached so far.
    pub fn waypoints_reached(&self) -> usize {
        self.waypoint
    }

    /// Rearm commands issued so far.
    pub fn rearms(&self) -> u32 {
        self.rearms
    }

    /// React to the system state `elapsed` into the run.
    pub fn tick(&mut self, elapsed: Duration, system: &ControlSystem, plant: &mut TruckPlant) {
        self.disturb(elapsed, plant);

        let state = system.state();
        if state.fault && matches!(self.phase, Phase::Engaging | Phase::Driving) {
            tracing::warn!(fault = %system.current_fault(), "Operator sees latched fault");
            self.phase = Phase::AwaitingCooldown;
        }

        match self.phase {
            Phase::Idle if elapsed >= ENGAGE_AFTER => {
                system.set_command(OperatorCommand::automatic());
                self.phase = Phase::Engaging;
            }
            Phase::Engaging if state.automatic => {
                self.send_waypoint(system);
                self.phase = Phase::Driving;
            }
            Phase::Driving if system.nav_state() == NavMode::Arrived => {
                let target = system.navigation().setpoint();
                if ROUTE.get(self.waypoint) != Some(&(target.target_x, target.target_y)) {
                    // Navigation reset the setpoint before it saw automatic mode.
                    self.send_waypoint(system);
                    return;
                }
                self.waypoint = self.waypoint.saturating_add(1);
                tracing::info!(waypoint = self.waypoint, "Waypoint reached");
                if self.waypoint < ROUTE.len() {
                    self.send_waypoint(system);
                } else {
                    tracing::info!("Route complete");
                    self.phase = Phase::Finished;
                }
            }
            Phase::AwaitingCooldown if system.current_fault() == FaultKind::None => {
                system.set_command(OperatorCommand::rearm());
                self.rearms = self.rearms.saturating_add(1);
                tracing::info!("Operator rearms");
                self.phase = Phase::Rearming;
            }
            Phase::Rearming if !state.fault => {
                system.set_command(OperatorCommand::automatic());
                self.phase = Phase::Engaging;
            }
            Phase::Rearming if system.current_fault() != FaultKind::None => {
                self.phase = Phase::AwaitingCooldown;
            }
            _ => {}
        }
    }

    fn send_waypoint(&self, system: &ControlSystem) {
        if let Some(&(x, y)) = ROUTE.get(self.waypoint) {
            system.set_setpoint(NavigationSetpoint::at(x, y));
        }
    }

    fn disturb(&mut self, elapsed: Duration, plant: &mut TruckPlant) {
        if self.scenario == Scenario::Nominal {
            return;
        }
        if !self.disturbance_applied && elapsed >= DISTURBANCE_START {
            self.disturbance_applied = true;
            if self.scenario == Scenario::Overheat {
                tracing::info!(target_temp_c = OVERHEAT_TEMP_C, "Scenario: engine overheating");
                plant.set_target_temperature(OVERHEAT_TEMP_C);
            } else {
                tracing::info!("Scenario: hydraulic pressure lost");
                plant.set_hydraulic_fault(true);
            }
        }
        if !self.disturbance_cleared && elapsed >= DISTURBANCE_END {
            self.disturbance_cleared = true;
            if self.scenario == Scenario::Overheat {
                tracing::info!("Scenario: engine cooling");
                plant.restore_ambient();
            } else {
                tracing::info!("Scenario: hydraulic pressure restored");
                plant.set_hydraulic_fault(false);
            }
        }
    }
}
