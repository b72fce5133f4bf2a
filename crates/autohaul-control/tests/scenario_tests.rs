//! End-to-end cycle scenarios driven deterministically through `run_cycle`.

use autohaul_channel::SharedSensorChannel;
use autohaul_control::prelude::*;
use autohaul_test_helpers::prelude::*;
use autohaul_types::{ActuatorCommand, FaultKind, NavigationSetpoint, OperatorCommand};
use parking_lot::Mutex;
use std::sync::Arc;

type TestResult = Result<(), Box<dyn std::error::Error>>;

struct Rig {
    channel: Arc<SharedSensorChannel>,
    monitor: FaultMonitor,
    navigation: Arc<NavigationControl>,
    logic: CommandLogic,
}

impl Rig {
    fn new() -> Self {
        let channel = Arc::new(SharedSensorChannel::new());
        let thresholds = FaultThresholds::default();
        let monitor = FaultMonitor::new(
            Arc::clone(&channel),
            thresholds,
            FaultMonitorConfig::default(),
            TaskServices::detached(),
        );
        let navigation = Arc::new(NavigationControl::new(
            Arc::clone(&channel),
            NavigationConfig::default(),
            TaskServices::detached(),
        ));
        let logic = CommandLogic::new(
            Arc::clone(&channel),
            thresholds,
            CommandLogicConfig::default(),
            Some(Arc::clone(&navigation)),
            TaskServices::detached(),
        );
        Self {
            channel,
            monitor,
            navigation,
            logic,
        }
    }

    fn cycle(&self) {
        let _event = self.monitor.run_cycle();
        let _output = self.navigation.run_cycle();
        let _events = self.logic.run_cycle();
    }
}

#[test]
fn temperature_excursion_with_rearm() -> TestResult {
    let rig = Rig::new();
    let changes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&changes);
    rig.monitor
        .register_fault_callback(move |kind, _| sink.lock().push(kind));

    let mut classifications = Vec::new();
    for reading in temperature_profile(&[80, 100, 130, 100, 80]) {
        rig.channel.write(reading);
        rig.cycle();
        classifications.push(rig.monitor.get_current_fault());
    }

    assert_eq!(
        classifications,
        vec![
            FaultKind::None,
            FaultKind::TemperatureAlert,
            FaultKind::TemperatureCritical,
            FaultKind::TemperatureAlert,
            FaultKind::None,
        ]
    );
    assert_eq!(
        changes.lock().as_slice(),
        &[
            FaultKind::TemperatureAlert,
            FaultKind::TemperatureCritical,
            FaultKind::TemperatureAlert,
            FaultKind::None,
        ]
    );

    // The fault stays latched until an explicit rearm.
    assert!(rig.logic.get_state().fault);
    rig.logic.set_command(OperatorCommand::rearm());
    rig.cycle();
    assert!(rig.logic.get_state().fault);
    rig.cycle();
    assert!(!rig.logic.get_state().fault);
    Ok(())
}

#[test]
fn manual_steering_saturates_at_limit() {
    let rig = Rig::new();
    rig.channel.write(ReadingBuilder::new().temperature_c(25).build());

    for _ in 0..40 {
        rig.logic.set_command(OperatorCommand::drive(0, 5, 0));
        rig.cycle();
    }
    assert_eq!(rig.logic.get_actuator_output().steering, 180);

    for _ in 0..100 {
        rig.logic.set_command(OperatorCommand::drive(0, 0, 7));
        rig.cycle();
    }
    assert_eq!(rig.logic.get_actuator_output().steering, -180);
}

#[test]
fn fault_blocks_automatic_and_navigation() {
    let rig = Rig::new();
    rig.channel
        .write(ReadingBuilder::new().hydraulic_fault().build());
    rig.navigation.set_setpoint(NavigationSetpoint::at(100, 100));

    rig.logic.set_command(OperatorCommand::automatic());
    rig.cycle();
    rig.cycle();

    let state = rig.logic.get_state();
    assert!(state.fault);
    assert!(!state.automatic);
    assert_eq!(rig.logic.get_actuator_output(), ActuatorCommand::stopped());
    assert_eq!(rig.navigation.get_output(), ActuatorCommand::stopped());
}

#[test]
fn fault_while_automatic_stops_and_keeps_mode() {
    let rig = Rig::new();
    rig.channel.write(ReadingBuilder::new().build());
    rig.logic.set_command(OperatorCommand::automatic());
    rig.cycle();
    rig.navigation.set_setpoint(NavigationSetpoint::at(200, 0));
    rig.cycle();
    rig.cycle();
    assert_eq!(rig.logic.get_actuator_output().velocity, 30);

    rig.channel
        .write(ReadingBuilder::new().electrical_fault().build());
    rig.cycle();
    assert_eq!(rig.logic.get_actuator_output(), ActuatorCommand::stopped());
    assert!(rig.logic.get_state().automatic);

    rig.cycle();
    let setpoint = rig.navigation.setpoint();
    assert_eq!((setpoint.target_x, setpoint.target_y), (0, 0));
}

#[test]
fn navigation_drives_to_target_and_arrives() {
    let rig = Rig::new();
    rig.channel.write(ReadingBuilder::new().heading(90).build());
    rig.logic.set_command(OperatorCommand::automatic());
    rig.cycle();
    rig.navigation.set_setpoint(NavigationSetpoint::at(50, 0));

    // Facing north with the target due east: rotate clockwise first.
    rig.cycle();
    rig.cycle();
    assert_eq!(rig.navigation.nav_state(), NavMode::Rotating);
    assert_eq!(rig.logic.get_actuator_output(), ActuatorCommand::new(0, -40));

    rig.channel.write(ReadingBuilder::new().heading(2).build());
    rig.cycle();
    assert_eq!(rig.navigation.nav_state(), NavMode::Moving);
    assert_eq!(rig.logic.get_actuator_output(), ActuatorCommand::new(30, 0));

    rig.channel
        .write(ReadingBuilder::new().position(47, 1).heading(2).build());
    rig.cycle();
    assert_eq!(rig.navigation.nav_state(), NavMode::Arrived);
    let output = rig.logic.get_actuator_output();
    assert!(output.arrived);
    assert_eq!((output.velocity, output.steering), (0, 0));
}

#[test]
fn switching_to_manual_hands_over_steering() {
    let rig = Rig::new();
    rig.channel.write(ReadingBuilder::new().build());
    rig.logic.set_command(OperatorCommand::automatic());
    rig.cycle();
    rig.navigation.set_setpoint(NavigationSetpoint::at(0, 100));
    rig.cycle();
    rig.cycle();
    assert_eq!(rig.logic.get_actuator_output().steering, 40);

    rig.logic.set_command(OperatorCommand::manual());
    rig.cycle();
    let output = rig.logic.get_actuator_output();
    assert!(!rig.logic.get_state().automatic);
    assert_eq!((output.velocity, output.steering), (0, 40));
}
