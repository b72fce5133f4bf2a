//! Closed-loop run: plant, control core and operator together.

use anyhow::{Context, Result};
use autohaul_control::{ControlSystem, TaskServices};
use autohaul_scheduler::{
    NoopElevator, PeriodicTask, PeriodicTaskConfig, PriorityElevator, TaskPriority,
    native_elevator,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::config::SimConfig;
use crate::plant::TruckPlant;
use crate::report::RunSummary;
use crate::scenario::{Operator, Scenario};

/// Task name of the sensor producer loop.
const SENSOR_TASK: &str = "sensor_producer";

/// How often the operator looks at the system.
const OPERATOR_TICK: Duration = Duration::from_millis(50);

pub async fn run(config: &SimConfig, scenario: Scenario, duration: Duration) -> Result<RunSummary> {
    let elevator: Arc<dyn PriorityElevator> = if config.control.elevate_priorities {
        native_elevator()
    } else {
        Arc::new(NoopElevator)
    };
    let system = Arc::new(
        ControlSystem::with_elevator(config.control.clone(), Arc::clone(&elevator))
            .context("Failed to build control system")?,
    );
    let plant = Arc::new(Mutex::new(TruckPlant::new(config.plant)));

    let fault_transitions = Arc::new(AtomicU64::new(0));
    {
        let counter = Arc::clone(&fault_transitions);
        system.fault_monitor().register_fault_callback(move |_, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        });
    }

    // Seed the channel so the loops never start from the zero reading.
    system.publish_reading(plant.lock().reading());
    system.start().context("Failed to start control system")?;

    let services = TaskServices::new(Arc::clone(&elevator))
        .with_watchdog(Arc::clone(system.watchdog()))
        .with_performance(Arc::clone(system.performance()));
    let mut producer = match spawn_producer(&system, &plant, &services, config.sensor_period()) {
        Ok(producer) => producer,
        Err(e) => {
            services.unregister(SENSOR_TASK);
            system.stop();
            return Err(e);
        }
    };

    tracing::info!(
        ?scenario,
        duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        "Simulation running"
    );

    let mut operator = Operator::new(scenario);
    let started = Instant::now();
    let mut operator_tick = tokio::time::interval(OPERATOR_TICK);
    let mut status_tick = tokio::time::interval(config.status_interval());
    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let interrupted = loop {
        tokio::select! {
            () = &mut deadline => break false,
            signal = &mut ctrl_c => {
                if let Err(e) = signal {
                    tracing::warn!(error = %e, "Failed to listen for ctrl-c");
                }
                tracing::info!("Interrupted, shutting down");
                break true;
            }
            _ = operator_tick.tick() => {
                let mut plant = plant.lock();
                operator.tick(started.elapsed(), &system, &mut plant);
            }
            _ = status_tick.tick() => log_status(&system),
        }
    };

    producer.stop();
    services.unregister(SENSOR_TASK);
    system.stop();

    let (position, heading_deg, temperature_c) = {
        let plant = plant.lock();
        (plant.position(), plant.heading_deg(), plant.temperature_c())
    };
    let performance = system.performance();
    Ok(RunSummary {
        scenario,
        elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        interrupted,
        final_state: system.state(),
        final_output: system.actuator_output(),
        final_fault: system.current_fault(),
        nav_mode: system.nav_state(),
        position,
        heading_deg,
        temperature_c,
        waypoints_reached: operator.waypoints_reached(),
        fault_transitions: fault_transitions.load(Ordering::Relaxed),
        rearms: operator.rearms(),
        watchdog_faults: system.watchdog().fault_count(),
        channel_overwrites: system.channel().overwrite_count(),
        dropped_fault_events: system.fault_monitor().dropped_events(),
        tasks: performance.get_all_stats(),
        performance_table: performance.report(),
    })
}

/// Start the plant loop, supervised like the control loops.
fn spawn_producer(
    system: &Arc<ControlSystem>,
    plant: &Arc<Mutex<TruckPlant>>,
    services: &TaskServices,
    period: Duration,
) -> Result<PeriodicTask> {
    services.register(SENSOR_TASK, period);
    let system = Arc::clone(system);
    let plant = Arc::clone(plant);
    let cycle_services = services.clone();
    PeriodicTask::spawn(
        PeriodicTaskConfig::new(SENSOR_TASK, period, TaskPriority::Lowest),
        Arc::clone(services.elevator()),
        move || {
            cycle_services.run_cycle(SENSOR_TASK, || {
                let command = system.actuator_output();
                let reading = {
                    let mut plant = plant.lock();
                    plant.advance(command, period);
                    plant.reading()
                };
                system.publish_reading(reading);
            });
        },
    )
    .context("Failed to start sensor producer")
}

fn log_status(system: &ControlSystem) {
    let reading = system.command_logic().get_latest_sensor_data();
    let output = system.actuator_output();
    tracing::info!(
        state = %system.state(),
        nav = %system.nav_state(),
        x = reading.position_x,
        y = reading.position_y,
        heading = reading.heading_deg,
        temperature_c = reading.temperature_c,
        velocity = output.velocity,
        steering = output.steering,
        "Status"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plant::PlantConfig;
    use autohaul_control::ControlConfig;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn producer_heartbeats_and_reports_timing() -> TestResult {
        let system = Arc::new(ControlSystem::with_elevator(
            ControlConfig::default(),
            Arc::new(NoopElevator),
        )?);
        let plant = Arc::new(Mutex::new(TruckPlant::new(PlantConfig::default())));
        let services = TaskServices::new(Arc::new(NoopElevator))
            .with_watchdog(Arc::clone(system.watchdog()))
            .with_performance(Arc::clone(system.performance()));

        let mut producer = spawn_producer(&system, &plant, &services, Duration::from_millis(5))?;
        let deadline = Instant::now() + Duration::from_secs(2);
        let heartbeats = || {
            system
                .watchdog()
                .task_health(SENSOR_TASK)
                .map_or(0, |h| h.heartbeats)
        };
        while heartbeats() == 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        producer.stop();

        assert!(heartbeats() > 0);
        let samples = system
            .performance()
            .get_stats(SENSOR_TASK)
            .map_or(0, |s| s.sample_count);
        assert!(samples > 0);

        services.unregister(SENSOR_TASK);
        assert!(system.watchdog().task_health(SENSOR_TASK).is_none());
        Ok(())
    }
}
