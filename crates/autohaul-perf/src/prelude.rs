//! Prelude for autohaul-perf.

pub use crate::config::PerformanceConfig;
pub use crate::error::{PerfError, PerfResult};
pub use crate::monitor::{MeasurementGuard, PerformanceMonitor};
pub use crate::stats::{SampleOutcome, TaskExecutionStats};
