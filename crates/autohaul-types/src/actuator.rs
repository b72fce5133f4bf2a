//! Actuator output and its legal ranges.

use serde::{Deserialize, Serialize};

/// Lowest legal velocity command (percent).
pub const VELOCITY_MIN: i32 = -100;
/// Highest legal velocity command (percent).
pub const VELOCITY_MAX: i32 = 100;
/// Lowest legal steering command (degrees).
pub const STEERING_MIN: i32 = -180;
/// Highest legal steering command (degrees).
pub const STEERING_MAX: i32 = 180;

/// Velocity and steering sent to the actuators.
///
/// Values exposed through any getter have already passed through
/// [`ActuatorCommand::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ActuatorCommand {
    /// Velocity in percent, `[-100, 100]`.
    pub velocity: i32,
    /// Steering in degrees, `[-180, 180]`. Positive turns left.
    pub steering: i32,
    /// Navigation reached its target.
    pub arrived: bool,
}

impl ActuatorCommand {
    /// Zero velocity and steering, not arrived.
    #[must_use]
    pub const fn stopped() -> Self {
        Self {
            velocity: 0,
            steering: 0,
            arrived: false,
        }
    }

    /// Builds a command from raw values, clamping both axes.
    #[must_use]
    pub fn new(velocity: i32, steering: i32) -> Self {
        Self {
            velocity,
            steering,
            arrived: false,
        }
        .clamped()
    }

    /// Returns a copy with velocity and steering clamped to their ranges.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            velocity: clamp_velocity(self.velocity),
            steering: clamp_steering(self.steering),
            arrived: self.arrived,
        }
    }

    /// Returns true when both axes are inside their legal ranges.
    #[must_use]
    pub fn is_within_limits(&self) -> bool {
        (VELOCITY_MIN..=VELOCITY_MAX).contains(&self.velocity)
            && (STEERING_MIN..=STEERING_MAX).contains(&self.steering)
    }
}

/// Clamps a velocity command to `[VELOCITY_MIN, VELOCITY_MAX]`.
#[must_use]
pub fn clamp_velocity(value: i32) -> i32 {
    value.clamp(VELOCITY_MIN, VELOCITY_MAX)
}

/// Clamps a steering command to `[STEERING_MIN, STEERING_MAX]`.
#[must_use]
pub fn clamp_steering(value: i32) -> i32 {
    value.clamp(STEERING_MIN, STEERING_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_saturates_both_axes() {
        let cmd = ActuatorCommand {
            velocity: 250,
            steering: -999,
            arrived: true,
        }
        .clamped();
        assert_eq!(cmd.velocity, VELOCITY_MAX);
        assert_eq!(cmd.steering, STEERING_MIN);
        assert!(cmd.arrived);
    }

    #[test]
    fn in_range_values_pass_through() {
        let cmd = ActuatorCommand::new(-40, 90);
        assert_eq!(cmd.velocity, -40);
        assert_eq!(cmd.steering, 90);
        assert!(cmd.is_within_limits());
    }

    #[test]
    fn stopped_is_default() {
        assert_eq!(ActuatorCommand::stopped(), ActuatorCommand::default());
    }
}
