//! Shared value types for the Autohaul truck control core.
//!
//! Every type in this crate is a plain `Copy` value. Components exchange
//! them by copying through getters and setters, never by sharing references
//! across component locks.
//!
//! - [`SensorReading`] - one filtered sample written into the sensor channel
//! - [`TruckState`] - authoritative `{fault, automatic}` pair owned by command logic
//! - [`ActuatorCommand`] - clamped velocity/steering output
//! - [`OperatorCommand`] - transient operator input, consumed once per cycle
//! - [`NavigationSetpoint`] - target supplied by the route planner
//! - [`FaultKind`] - severity-ordered fault classification

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs,
    missing_debug_implementations
)]

pub mod actuator;
pub mod command;
pub mod fault;
pub mod navigation;
pub mod sensor;
pub mod state;

pub mod prelude;

pub use actuator::{
    ActuatorCommand, STEERING_MAX, STEERING_MIN, VELOCITY_MAX, VELOCITY_MIN, clamp_steering,
    clamp_velocity,
};
pub use command::OperatorCommand;
pub use fault::FaultKind;
pub use navigation::NavigationSetpoint;
pub use sensor::SensorReading;
pub use state::TruckState;
