//! Toy kinematic truck model used as the sensor producer.
//!
//! Velocity moves the truck along its heading, steering turns it in place.
//! Temperature relaxes towards a target set by the scenario. There is no
//! inertia, no slip and no electrical system.

use autohaul_types::{ActuatorCommand, SensorReading, VELOCITY_MAX};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::SimError;

/// Plant model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantConfig {
    /// Distance covered per second at full velocity.
    pub top_speed: f64,
    /// Yaw rate (degrees per second) per degree of steering.
    pub yaw_gain: f64,
    /// Temperature with no scenario override (°C).
    pub ambient_temp_c: f64,
    /// Fraction of the gap to the target temperature closed per second.
    pub thermal_rate: f64,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            top_speed: 20.0,
            yaw_gain: 1.0,
            ambient_temp_c: 70.0,
            thermal_rate: 2.0,
        }
    }
}

impl PlantConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        let fields = [
            ("plant.top_speed", self.top_speed),
            ("plant.yaw_gain", self.yaw_gain),
            ("plant.thermal_rate", self.thermal_rate),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::InvalidConfiguration(format!(
                    "{name} must be finite and positive"
                )));
            }
        }
        if !self.ambient_temp_c.is_finite() {
            return Err(SimError::InvalidConfiguration(
                "plant.ambient_temp_c must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Truck pose, temperature and fault flags.
#[derive(Debug, Clone, PartialEq)]
pub struct TruckPlant {
    config: PlantConfig,
    x: f64,
    y: f64,
    heading_deg: f64,
    temperature_c: f64,
    target_temp_c: f64,
    hydraulic_fault: bool,
    elapsed: Duration,
}

impl TruckPlant {
    pub fn new(config: PlantConfig) -> Self {
        Self {
            config,
            x: 0.0,
            y: 0.0,
            heading_deg: 0.0,
            temperature_c: config.ambient_temp_c,
            target_temp_c: config.ambient_temp_c,
            hydraulic_fault: false,
            elapsed: Duration::ZERO,
        }
    }

    /// Temperature the plant drifts towards.
    pub fn set_target_temperature(&mut self, temperature_c: f64) {
        self.target_temp_c = temperature_c;
    }

    /// Drift back to ambient temperature.
    pub fn restore_ambient(&mut self) {
        self.target_temp_c = self.config.ambient_temp_c;
    }

    pub fn set_hydraulic_fault(&mut self, fault: bool) {
        self.hydraulic_fault = fault;
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn heading_deg(&self) -> f64 {
        self.heading_deg
    }

    pub fn temperature_c(&self) -> f64 {
        self.temperature_c
    }

    /// Integrate one step of `dt` under `command`.
    pub fn advance(&mut self, command: ActuatorCommand, dt: Duration) {
        let seconds = dt.as_secs_f64();
        let command = command.clamped();

        let yaw = f64::from(command.steering) * self.config.yaw_gain * seconds;
        self.heading_deg = (self.heading_deg + yaw).rem_euclid(360.0);

        let speed = f64::from(command.velocity) / f64::from(VELOCITY_MAX) * self.config.top_speed;
        let heading = self.heading_deg.to_radians();
        self.x += speed * heading.cos() * seconds;
        self.y += speed * heading.sin() * seconds;

        let blend = (self.config.thermal_rate * seconds).min(1.0);
        self.temperature_c += (self.target_temp_c - self.temperature_c) * blend;

        self.elapsed = self.elapsed.saturating_add(dt);
    }

    /// Current state as a sensor reading.
    pub fn reading(&self) -> SensorReading {
        SensorReading {
            position_x: round_to_i32(self.x),
            position_y: round_to_i32(self.y),
            heading_deg: round_to_i32(self.heading_deg).rem_euclid(360),
            temperature_c: round_to_i32(self.temperature_c),
            electrical_fault: false,
            hydraulic_fault: self.hydraulic_fault,
            timestamp_ms: u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "value is rounded and clamped to the i32 range first"
)]
fn round_to_i32(value: f64) -> i32 {
    value
        .round()
        .clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}
