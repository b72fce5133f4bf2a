//! Performance monitor configuration.

use serde::{Deserialize, Serialize};

use crate::error::{PerfError, PerfResult};

/// Performance monitor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Samples kept for the standard deviation window.
    pub window: usize,
    /// Share of the period above which a cycle counts as high utilization.
    pub high_utilization_ratio: f64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            window: 100,
            high_utilization_ratio: 0.8,
        }
    }
}

impl PerformanceConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the window is empty or the ratio is outside `(0, 1]`.
    pub fn validate(&self) -> PerfResult<()> {
        if self.window == 0 {
            return Err(PerfError::invalid_configuration(
                "window must be greater than 0",
            ));
        }
        if !(self.high_utilization_ratio > 0.0 && self.high_utilization_ratio <= 1.0) {
            return Err(PerfError::invalid_configuration(
                "high_utilization_ratio must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(PerformanceConfig::default().validate().is_ok());

        let empty = PerformanceConfig {
            window: 0,
            ..Default::default()
        };
        assert!(empty.validate().is_err());

        for ratio in [0.0, -0.5, 1.5, f64::NAN] {
            let config = PerformanceConfig {
                high_utilization_ratio: ratio,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "ratio {ratio} accepted");
        }
    }
}
