//! Navigation setpoints.

use serde::{Deserialize, Serialize};

/// Target supplied by the route planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationSetpoint {
    /// Target X coordinate.
    pub target_x: i32,
    /// Target Y coordinate.
    pub target_y: i32,
    /// Target speed in percent. Informational; cruise speed is fixed.
    pub target_speed: i32,
    /// Target heading in degrees.
    pub target_angle: i32,
}

impl NavigationSetpoint {
    /// A setpoint at `(x, y)` with no speed or heading preference.
    #[must_use]
    pub fn at(target_x: i32, target_y: i32) -> Self {
        Self {
            target_x,
            target_y,
            ..Self::default()
        }
    }

    /// Returns true when `other` names a different target position.
    ///
    /// Only the position counts; speed and angle changes do not reset arrival.
    #[must_use]
    pub fn is_new_target(&self, other: &Self) -> bool {
        self.target_x != other.target_x || self.target_y != other.target_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_target_ignores_speed_and_angle() {
        let a = NavigationSetpoint::at(10, 20);
        let b = NavigationSetpoint {
            target_speed: 50,
            target_angle: 90,
            ..a
        };
        assert!(!a.is_new_target(&b));
        assert!(a.is_new_target(&NavigationSetpoint::at(10, 21)));
    }
}
