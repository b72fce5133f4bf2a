//! Threaded tests of the assembled control system.

use autohaul_control::prelude::*;
use autohaul_control::{COMMAND_LOGIC_TASK, FAULT_MONITOR_TASK, NAVIGATION_TASK};
use autohaul_test_helpers::prelude::*;
use autohaul_types::{FaultKind, NavigationSetpoint, OperatorCommand};
use std::time::Duration;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn fast_config() -> Result<ControlConfig, ControlError> {
    ControlConfig::builder()
        .elevate_priorities(false)
        .periods_ms(10, 10, 10)
        .build()
}

#[test]
fn loops_register_with_monitors_while_running() -> TestResult {
    let system = ControlSystem::new(fast_config()?)?;
    system.start()?;
    assert_eq!(system.watchdog().task_count(), 3);

    must_within(Duration::from_secs(2), "every loop reports timing", || {
        [FAULT_MONITOR_TASK, COMMAND_LOGIC_TASK, NAVIGATION_TASK]
            .iter()
            .all(|task| {
                system
                    .performance()
                    .get_stats(task)
                    .is_some_and(|s| s.sample_count > 0)
            })
    });

    system.stop();
    assert_eq!(system.watchdog().task_count(), 0);
    assert!(!system.watchdog().is_running());
    Ok(())
}

#[test]
fn running_system_latches_and_clears_fault() -> TestResult {
    let system = ControlSystem::new(fast_config()?)?;
    system.start()?;

    system.publish_reading(ReadingBuilder::new().temperature_c(135).build());
    must_within(Duration::from_secs(2), "fault latched", || {
        system.state().fault && system.current_fault() == FaultKind::TemperatureCritical
    });

    system.publish_reading(ReadingBuilder::new().temperature_c(60).build());
    must_within(Duration::from_secs(2), "classification cleared", || {
        system.current_fault() == FaultKind::None
    });
    assert!(system.state().fault);

    system.set_command(OperatorCommand::rearm());
    must_within(Duration::from_secs(2), "fault cleared after rearm", || {
        !system.state().fault
    });

    system.stop();
    Ok(())
}

#[test]
fn running_system_navigates_in_automatic() -> TestResult {
    let system = ControlSystem::new(fast_config()?)?;
    system.start()?;

    system.publish_reading(ReadingBuilder::new().heading(0).build());
    system.set_command(OperatorCommand::automatic());
    must_within(Duration::from_secs(2), "automatic mode", || {
        system.state().automatic
    });

    // Wait for navigation to observe automatic mode before moving the target.
    must_within(Duration::from_secs(2), "navigation settled", || {
        system.nav_state() == NavMode::Arrived
    });
    system.set_setpoint(NavigationSetpoint::at(500, 0));
    must_within(Duration::from_secs(2), "cruising", || {
        system.actuator_output().velocity == 30
    });

    system.stop();
    Ok(())
}

#[test]
fn fault_events_reach_subscribers() -> TestResult {
    let system = ControlSystem::new(fast_config()?)?;
    let events = system.fault_monitor().subscribe();
    system.start()?;

    system.publish_reading(ReadingBuilder::new().electrical_fault().build());
    let event = events.recv_timeout(Duration::from_secs(2))?;
    assert_eq!(event.previous, FaultKind::None);
    assert_eq!(event.current, FaultKind::Electrical);

    system.stop();
    Ok(())
}
