//! Authoritative truck state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// `{fault, automatic}` pair. Command logic is the only writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TruckState {
    /// A fault is latched and has not been rearmed.
    pub fault: bool,
    /// Automatic (navigation-driven) mode is active.
    pub automatic: bool,
}

impl TruckState {
    /// Returns true when navigation is allowed to drive the actuators.
    #[must_use]
    pub fn navigation_enabled(&self) -> bool {
        self.automatic && !self.fault
    }
}

impl fmt::Display for TruckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.automatic { "automatic" } else { "manual" };
        let health = if self.fault { "fault" } else { "ok" };
        write!(f, "{mode}/{health}")
    }
}
