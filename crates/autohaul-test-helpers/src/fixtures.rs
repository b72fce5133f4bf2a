//! Builders for test inputs.

use autohaul_types::SensorReading;

/// Builder for [`SensorReading`] values.
///
/// ```rust
/// use autohaul_test_helpers::prelude::*;
///
/// let reading = ReadingBuilder::new().position(10, -4).temperature_c(130).build();
/// assert_eq!(reading.position(), (10, -4));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadingBuilder {
    reading: SensorReading,
}

impl ReadingBuilder {
    /// Starts from the zero reading.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the position.
    #[must_use]
    pub fn position(mut self, x: i32, y: i32) -> Self {
        self.reading.position_x = x;
        self.reading.position_y = y;
        self
    }

    /// Sets the heading in degrees.
    #[must_use]
    pub fn heading(mut self, degrees: i32) -> Self {
        self.reading.heading_deg = degrees;
        self
    }

    /// Sets the temperature.
    #[must_use]
    pub fn temperature_c(mut self, celsius: i32) -> Self {
        self.reading.temperature_c = celsius;
        self
    }

    /// Raises the electrical fault flag.
    #[must_use]
    pub fn electrical_fault(mut self) -> Self {
        self.reading.electrical_fault = true;
        self
    }

    /// Raises the hydraulic fault flag.
    #[must_use]
    pub fn hydraulic_fault(mut self) -> Self {
        self.reading.hydraulic_fault = true;
        self
    }

    /// Sets the timestamp.
    #[must_use]
    pub fn timestamp_ms(mut self, ms: u64) -> Self {
        self.reading.timestamp_ms = ms;
        self
    }

    /// Finishes the reading.
    #[must_use]
    pub fn build(self) -> SensorReading {
        self.reading
    }
}

/// One reading per temperature, timestamped 0, 1, 2, ...
#[must_use]
pub fn temperature_profile(temperatures: &[i32]) -> Vec<SensorReading> {
    temperatures
        .iter()
        .zip(0u64..)
        .map(|(&t, ms)| ReadingBuilder::new().temperature_c(t).timestamp_ms(ms).build())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_all_fields() {
        let r = ReadingBuilder::new()
            .position(1, 2)
            .heading(90)
            .temperature_c(101)
            .electrical_fault()
            .hydraulic_fault()
            .timestamp_ms(5)
            .build();
        assert_eq!(r.position(), (1, 2));
        assert_eq!(r.heading_deg, 90);
        assert_eq!(r.temperature_c, 101);
        assert!(r.electrical_fault && r.hydraulic_fault);
        assert_eq!(r.timestamp_ms, 5);
    }

    #[test]
    fn profile_timestamps_are_sequential() {
        let profile = temperature_profile(&[80, 100, 130]);
        let stamps: Vec<u64> = profile.iter().map(|r| r.timestamp_ms).collect();
        assert_eq!(stamps, vec![0, 1, 2]);
    }
}
