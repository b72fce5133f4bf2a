//! Prelude for autohaul-types.
//!
//! ```rust
//! use autohaul_types::prelude::*;
//!
//! let reading = SensorReading::default();
//! assert_eq!(FaultKind::classify(&reading, 120, 95), FaultKind::None);
//! ```

pub use crate::actuator::{
    ActuatorCommand, STEERING_MAX, STEERING_MIN, VELOCITY_MAX, VELOCITY_MIN,
};
pub use crate::command::OperatorCommand;
pub use crate::fault::FaultKind;
pub use crate::navigation::NavigationSetpoint;
pub use crate::sensor::SensorReading;
pub use crate::state::TruckState;
