//! Control core configuration.

use autohaul_perf::PerformanceConfig;
use autohaul_watchdog::WatchdogConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ControlError, ControlResult};

/// Temperature thresholds shared by fault monitoring and command logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultThresholds {
    /// Readings strictly above this latch a fault (°C).
    pub critical_temp_c: i32,
    /// Readings strictly above this raise a temperature alert (°C).
    pub alert_temp_c: i32,
}

impl Default for FaultThresholds {
    fn default() -> Self {
        Self {
            critical_temp_c: 120,
            alert_temp_c: 95,
        }
    }
}

/// Fault monitor loop settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultMonitorConfig {
    /// Loop period (milliseconds).
    pub period_ms: u64,
    /// Bounded queue length for each fault event subscriber.
    pub event_queue_capacity: usize,
}

impl Default for FaultMonitorConfig {
    fn default() -> Self {
        Self {
            period_ms: 100,
            event_queue_capacity: 64,
        }
    }
}

impl FaultMonitorConfig {
    /// Loop period as a `Duration`.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

/// Command logic loop settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandLogicConfig {
    /// Loop period (milliseconds).
    pub period_ms: u64,
}

impl Default for CommandLogicConfig {
    fn default() -> Self {
        Self { period_ms: 50 }
    }
}

impl CommandLogicConfig {
    /// Loop period as a `Duration`.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

/// Navigation loop settings and guidance parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Loop period (milliseconds).
    pub period_ms: u64,
    /// Distance at or below which the target counts as reached.
    pub arrival_radius: f64,
    /// Heading error (degrees) at or below which the truck stops rotating.
    ///
    /// Moving falls back to rotating above twice this value.
    pub alignment_threshold_deg: f64,
    /// Velocity while moving towards the target (percent).
    pub cruise_speed: i32,
    /// Steering magnitude while rotating on the spot (degrees).
    pub rotation_rate: i32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            period_ms: 50,
            arrival_radius: 5.0,
            alignment_threshold_deg: 5.0,
            cruise_speed: 30,
            rotation_rate: 40,
        }
    }
}

impl NavigationConfig {
    /// Loop period as a `Duration`.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// Heading error above which a moving truck goes back to rotating.
    #[must_use]
    pub fn realignment_threshold_deg(&self) -> f64 {
        self.alignment_threshold_deg * 2.0
    }
}

/// Complete control core configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Sensor channel capacity.
    pub channel_capacity: usize,
    /// Request OS scheduling priorities for the loops.
    pub elevate_priorities: bool,
    /// Temperature thresholds.
    pub faults: FaultThresholds,
    /// Fault monitor loop.
    pub fault_monitor: FaultMonitorConfig,
    /// Command logic loop.
    pub command_logic: CommandLogicConfig,
    /// Navigation loop.
    pub navigation: NavigationConfig,
    /// Watchdog.
    pub watchdog: WatchdogConfig,
    /// Performance monitor.
    pub performance: PerformanceConfig,
}

impl ControlConfig {
    /// Default sensor channel capacity.
    pub const DEFAULT_CHANNEL_CAPACITY: usize = 200;

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> ControlConfigBuilder {
        ControlConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> ControlResult<()> {
        if self.channel_capacity == 0 {
            return Err(ControlError::invalid_configuration(
                "channel_capacity must be greater than 0",
            ));
        }
        if self.faults.alert_temp_c >= self.faults.critical_temp_c {
            return Err(ControlError::invalid_configuration(format!(
                "faults.alert_temp_c ({}) must be below faults.critical_temp_c ({})",
                self.faults.alert_temp_c, self.faults.critical_temp_c
            )));
        }
        for (name, period_ms) in [
            ("fault_monitor.period_ms", self.fault_monitor.period_ms),
            ("command_logic.period_ms", self.command_logic.period_ms),
            ("navigation.period_ms", self.navigation.period_ms),
        ] {
            if period_ms == 0 {
                return Err(ControlError::invalid_configuration(format!(
                    "{name} must be greater than 0"
                )));
            }
        }
        if self.fault_monitor.event_queue_capacity == 0 {
            return Err(ControlError::invalid_configuration(
                "fault_monitor.event_queue_capacity must be greater than 0",
            ));
        }

        let nav = &self.navigation;
        if !(nav.arrival_radius.is_finite() && nav.arrival_radius >= 0.0) {
            return Err(ControlError::invalid_configuration(
                "navigation.arrival_radius must be finite and non-negative",
            ));
        }
        if !(nav.alignment_threshold_deg > 0.0 && nav.alignment_threshold_deg < 90.0) {
            return Err(ControlError::invalid_configuration(
                "navigation.alignment_threshold_deg must be in (0, 90)",
            ));
        }
        if !(1..=autohaul_types::VELOCITY_MAX).contains(&nav.cruise_speed) {
            return Err(ControlError::invalid_configuration(
                "navigation.cruise_speed must be in [1, 100]",
            ));
        }
        if !(1..=autohaul_types::STEERING_MAX).contains(&nav.rotation_rate) {
            return Err(ControlError::invalid_configuration(
                "navigation.rotation_rate must be in [1, 180]",
            ));
        }

        self.watchdog.validate()?;
        self.performance.validate()?;
        Ok(())
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            channel_capacity: Self::DEFAULT_CHANNEL_CAPACITY,
            elevate_priorities: true,
            faults: FaultThresholds::default(),
            fault_monitor: FaultMonitorConfig::default(),
            command_logic: CommandLogicConfig::default(),
            navigation: NavigationConfig::default(),
            watchdog: WatchdogConfig::default(),
            performance: PerformanceConfig::default(),
        }
    }
}

/// Builder for [`ControlConfig`].
#[derive(Debug, Clone, Default)]
pub struct ControlConfigBuilder {
    config: ControlConfig,
}

impl ControlConfigBuilder {
    /// Set the sensor channel capacity.
    #[must_use]
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// Request OS scheduling priorities for the loops.
    #[must_use]
    pub fn elevate_priorities(mut self, elevate: bool) -> Self {
        self.config.elevate_priorities = elevate;
        self
    }

    /// Set the temperature thresholds.
    #[must_use]
    pub fn thresholds(mut self, critical_temp_c: i32, alert_temp_c: i32) -> Self {
        self.config.faults = FaultThresholds {
            critical_temp_c,
            alert_temp_c,
        };
        self
    }

    /// Set the three loop periods.
    #[must_use]
    pub fn periods_ms(mut self, fault_monitor: u64, command_logic: u64, navigation: u64) -> Self {
        self.config.fault_monitor.period_ms = fault_monitor;
        self.config.command_logic.period_ms = command_logic;
        self.config.navigation.period_ms = navigation;
        self
    }

    /// Set the navigation guidance parameters.
    #[must_use]
    pub fn navigation(mut self, navigation: NavigationConfig) -> Self {
        self.config.navigation = navigation;
        self
    }

    /// Set the watchdog configuration.
    #[must_use]
    pub fn watchdog(mut self, watchdog: WatchdogConfig) -> Self {
        self.config.watchdog = watchdog;
        self
    }

    /// Set the performance monitor configuration.
    #[must_use]
    pub fn performance(mut self, performance: PerformanceConfig) -> Self {
        self.config.performance = performance;
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting configuration is invalid.
    pub fn build(self) -> ControlResult<ControlConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
