//! Prelude for autohaul-watchdog.
//!
//! ```rust
//! use autohaul_watchdog::prelude::*;
//!
//! let watchdog = Watchdog::new(WatchdogConfig::default());
//! watchdog.register_task("fault_monitor", std::time::Duration::from_millis(400));
//! watchdog.heartbeat("fault_monitor");
//! ```

pub use crate::error::{WatchdogError, WatchdogResult};
pub use crate::health::{HealthStatus, TaskHealthRecord};
pub use crate::watchdog::{FaultHandler, Watchdog, WatchdogConfig, WatchdogConfigBuilder};
