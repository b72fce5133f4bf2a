//! Filtered sensor samples.

use serde::{Deserialize, Serialize};

/// One filtered sensor sample as stored in the shared sensor channel.
///
/// Positions are integer units in the site frame. Heading is in degrees,
/// counter-clockwise from East (0 = East, 90 = North).
///
/// The default value is the all-zero reading returned by an empty channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SensorReading {
    /// X coordinate.
    pub position_x: i32,
    /// Y coordinate.
    pub position_y: i32,
    /// Heading in degrees, 0 = East.
    pub heading_deg: i32,
    /// Engine temperature in degrees Celsius.
    pub temperature_c: i32,
    /// Electrical system fault flag.
    pub electrical_fault: bool,
    /// Hydraulic system fault flag.
    pub hydraulic_fault: bool,
    /// Sample time in milliseconds.
    pub timestamp_ms: u64,
}

impl SensorReading {
    /// Returns the `(x, y)` position.
    #[must_use]
    pub fn position(&self) -> (i32, i32) {
        (self.position_x, self.position_y)
    }

    /// Returns true when the reading shows a condition that latches the truck
    /// fault: temperature above `critical_temp_c` or either fault flag set.
    #[must_use]
    pub fn has_fault_condition(&self, critical_temp_c: i32) -> bool {
        self.temperature_c > critical_temp_c || self.electrical_fault || self.hydraulic_fault
    }
}
