//! Prelude for autohaul-scheduler.

pub use crate::clock::{DeadlineClock, Tick};
pub use crate::error::{SchedError, SchedResult};
pub use crate::priority::{
    NativeElevator, NoopElevator, PriorityElevator, TaskPriority, native_elevator,
};
pub use crate::task::{PeriodicTask, PeriodicTaskConfig, request_priority};
