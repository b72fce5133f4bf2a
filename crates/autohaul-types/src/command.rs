//! Operator input.

use serde::{Deserialize, Serialize};

/// Operator input issued through the HMI.
///
/// Command logic latches the most recent command and consumes it on its next
/// cycle; a cycle with no fresh command behaves like [`OperatorCommand::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorCommand {
    /// Request automatic mode.
    pub auto_mode: bool,
    /// Request manual mode.
    pub manual_mode: bool,
    /// Acknowledge a latched fault.
    pub rearm: bool,
    /// Manual velocity request, `[-100, 100]`.
    pub accelerate: i32,
    /// Manual steering increment to the left (increases the angle).
    pub steer_left: i32,
    /// Manual steering increment to the right (decreases the angle).
    pub steer_right: i32,
}

impl OperatorCommand {
    /// Request automatic mode.
    #[must_use]
    pub fn automatic() -> Self {
        Self {
            auto_mode: true,
            ..Self::default()
        }
    }

    /// Request manual mode.
    #[must_use]
    pub fn manual() -> Self {
        Self {
            manual_mode: true,
            ..Self::default()
        }
    }

    /// Acknowledge a latched fault.
    #[must_use]
    pub fn rearm() -> Self {
        Self {
            rearm: true,
            ..Self::default()
        }
    }

    /// Manual driving input.
    #[must_use]
    pub fn drive(accelerate: i32, steer_left: i32, steer_right: i32) -> Self {
        Self {
            accelerate,
            steer_left,
            steer_right,
            ..Self::default()
        }
    }

    /// Net steering increment for one cycle, `steer_left - steer_right`.
    ///
    /// Negative increments are treated as zero since both inputs are magnitudes.
    #[must_use]
    pub fn steering_delta(&self) -> i32 {
        self.steer_left
            .max(0)
            .saturating_sub(self.steer_right.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steering_delta_is_left_minus_right() {
        assert_eq!(OperatorCommand::drive(0, 5, 0).steering_delta(), 5);
        assert_eq!(OperatorCommand::drive(0, 0, 7).steering_delta(), -7);
        assert_eq!(OperatorCommand::drive(0, 3, 3).steering_delta(), 0);
    }

    #[test]
    fn negative_magnitudes_are_ignored() {
        assert_eq!(OperatorCommand::drive(0, -10, 0).steering_delta(), 0);
        assert_eq!(OperatorCommand::drive(0, 4, -10).steering_delta(), 4);
    }

    #[test]
    fn deserializes_partial_commands() -> Result<(), serde_json::Error> {
        let cmd: OperatorCommand = serde_json::from_str(r#"{"rearm": true}"#)?;
        assert_eq!(cmd, OperatorCommand::rearm());
        Ok(())
    }
}
