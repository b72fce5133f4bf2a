//! Simulator configuration file handling.

use autohaul_control::ControlConfig;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::SimError;
use crate::plant::PlantConfig;

/// Serialization format for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, SimError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(SimError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Everything the simulator needs: the control core plus the toy plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Control core configuration.
    pub control: ControlConfig,
    /// Plant model.
    pub plant: PlantConfig,
    /// Sensor producer period (milliseconds).
    pub sensor_period_ms: u64,
    /// Interval between status log lines (milliseconds).
    pub status_interval_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            control: ControlConfig::default(),
            plant: PlantConfig::default(),
            sensor_period_ms: 100,
            status_interval_ms: 1000,
        }
    }
}

impl SimConfig {
    pub fn sensor_period(&self) -> Duration {
        Duration::from_millis(self.sensor_period_ms)
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        self.control.validate()?;
        self.plant.validate()?;
        if self.sensor_period_ms == 0 {
            return Err(SimError::InvalidConfiguration(
                "sensor_period_ms must be greater than 0".to_string(),
            ));
        }
        if self.status_interval_ms == 0 {
            return Err(SimError::InvalidConfiguration(
                "status_interval_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let format = ConfigFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|source| SimError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text, format)?;
        config.validate()?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn parse(text: &str, format: ConfigFormat) -> Result<Self, SimError> {
        Ok(match format {
            ConfigFormat::Yaml => serde_yaml::from_str(text)?,
            ConfigFormat::Json => serde_json::from_str(text)?,
        })
    }

    pub fn render(&self, format: ConfigFormat) -> Result<String, SimError> {
        Ok(match format {
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn partial_yaml_fills_defaults() -> TestResult {
        let yaml = "control:\n  navigation:\n    cruise_speed: 45\nsensor_period_ms: 20\n";
        let config = SimConfig::parse(yaml, ConfigFormat::Yaml)?;
        assert_eq!(config.control.navigation.cruise_speed, 45);
        assert_eq!(config.control.navigation.rotation_rate, 40);
        assert_eq!(config.control.faults.critical_temp_c, 120);
        assert_eq!(config.sensor_period(), Duration::from_millis(20));
        config.validate()?;
        Ok(())
    }

    #[test]
    fn default_config_survives_json() -> TestResult {
        let rendered = SimConfig::default().render(ConfigFormat::Json)?;
        let parsed = SimConfig::parse(&rendered, ConfigFormat::Json)?;
        assert_eq!(parsed, SimConfig::default());
        Ok(())
    }

    #[test]
    fn format_from_extension() -> TestResult {
        assert_eq!(ConfigFormat::from_path(Path::new("a.YML"))?, ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.json"))?, ConfigFormat::Json);
        assert!(matches!(
            ConfigFormat::from_path(Path::new("a.toml")),
            Err(SimError::UnsupportedFormat(_))
        ));
        Ok(())
    }

    #[test]
    fn invalid_control_section_is_config_error() -> TestResult {
        let config = SimConfig::parse("control:\n  channel_capacity: 0\n", ConfigFormat::Yaml)?;
        let Err(err) = config.validate() else {
            return Err("expected validation failure".into());
        };
        assert_eq!(err.exit_code(), 2);
        Ok(())
    }
}
