//! Drift-free periodic task loops with priority hints.
//!
//! Every active component of the control core runs the same loop shape:
//! do one unit of work, sleep until the next deadline, advance the deadline
//! by exactly one period. Deadlines are anchored to the loop start, so
//! execution jitter never accumulates into drift.
//!
//! - [`DeadlineClock`]: the anchored deadline sequence
//! - [`PeriodicTask`]: a named thread running a body on a `DeadlineClock`
//! - [`PriorityElevator`]: scheduling priority hint, with a native adapter,
//!   a no-op adapter and a [`mock`] adapter for tests
//!
//! # Overruns
//!
//! If one iteration overruns its period the next one is not skipped. It runs
//! immediately and the anchor keeps advancing by whole periods, so sustained
//! overruns produce back-to-back execution rather than dropped cycles.
//!
//! # Example
//!
//! ```no_run
//! use autohaul_scheduler::prelude::*;
//! use std::time::Duration;
//!
//! let config = PeriodicTaskConfig::new("sampler", Duration::from_millis(50), TaskPriority::Lowest);
//! let mut task = PeriodicTask::spawn(config, native_elevator(), || {
//!     // one cycle of work
//! })?;
//! task.stop();
//! # Ok::<(), SchedError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]

pub mod clock;
pub mod error;
pub mod mock;
pub mod priority;
pub mod task;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
mod fallback;

pub mod prelude;

pub use clock::{DeadlineClock, Tick};
pub use error::{SchedError, SchedResult};
pub use mock::MockPriorityElevator;
pub use priority::{NativeElevator, NoopElevator, PriorityElevator, TaskPriority, native_elevator};
pub use task::{PeriodicTask, PeriodicTaskConfig, request_priority};
