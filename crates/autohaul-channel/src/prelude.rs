//! Prelude for autohaul-channel.

pub use crate::channel::{DEFAULT_CAPACITY, SharedSensorChannel};
