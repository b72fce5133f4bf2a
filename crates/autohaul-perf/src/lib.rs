//! Execution-time statistics and deadline monitoring.
//!
//! Each periodic task brackets one cycle of work with
//! [`PerformanceMonitor::start_measurement`] and
//! [`PerformanceMonitor::end_measurement`] (or the RAII
//! [`PerformanceMonitor::measure`] guard). The monitor keeps min, max,
//! incremental mean and a sliding-window standard deviation per task, counts
//! cycles that exceed the task period, and warns when a cycle uses more
//! than the configured share of its period.
//!
//! The monitor is purely observational: it logs and records, it never
//! changes what a task does.

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs,
    missing_debug_implementations
)]

pub mod config;
pub mod error;
pub mod monitor;
pub mod report;
pub mod stats;

pub mod prelude;

pub use config::PerformanceConfig;
pub use error::{PerfError, PerfResult};
pub use monitor::{MeasurementGuard, PerformanceMonitor};
pub use stats::{SampleOutcome, TaskExecutionStats};
