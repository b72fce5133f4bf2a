//! Fault classification.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::sensor::SensorReading;

/// Fault classification of a sensor reading.
///
/// Variants are declared in ascending severity, so the derived ordering can
/// be used to pick the worst of several classifications.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum FaultKind {
    /// No fault.
    #[default]
    None,
    /// Temperature above the alert threshold.
    TemperatureAlert,
    /// Hydraulic system fault flag.
    Hydraulic,
    /// Electrical system fault flag.
    Electrical,
    /// Temperature above the critical threshold.
    TemperatureCritical,
}

impl FaultKind {
    /// Classifies a reading using severity-ordered checks.
    ///
    /// Critical temperature wins over the electrical flag, which wins over the
    /// hydraulic flag, which wins over the temperature alert.
    #[must_use]
    pub fn classify(reading: &SensorReading, critical_temp_c: i32, alert_temp_c: i32) -> Self {
        if reading.temperature_c > critical_temp_c {
            Self::TemperatureCritical
        } else if reading.electrical_fault {
            Self::Electrical
        } else if reading.hydraulic_fault {
            Self::Hydraulic
        } else if reading.temperature_c > alert_temp_c {
            Self::TemperatureAlert
        } else {
            Self::None
        }
    }

    /// Returns the severity level, 0 for `None` up to 4 for critical temperature.
    #[must_use]
    pub fn severity(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::TemperatureAlert => 1,
            Self::Hydraulic => 2,
            Self::Electrical => 3,
            Self::TemperatureCritical => 4,
        }
    }

    /// Returns true for classifications that latch the truck fault.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Self::TemperatureCritical | Self::Electrical | Self::Hydraulic
        )
    }

    /// Short event code used in logs.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::TemperatureAlert => "TEMP_WRN",
            Self::TemperatureCritical => "TEMP_CRT",
            Self::Electrical => "ELEC",
            Self::Hydraulic => "HYDR",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "No fault"),
            Self::TemperatureAlert => write!(f, "Temperature alert"),
            Self::TemperatureCritical => write!(f, "Temperature critical"),
            Self::Electrical => write!(f, "Electrical fault"),
            Self::Hydraulic => write!(f, "Hydraulic fault"),
        }
    }
}
