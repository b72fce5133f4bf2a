//! # autohaul-watchdog
//!
//! Heartbeat watchdog for the periodic control tasks.
//!
//! Every periodic task registers a timeout and calls
//! [`Watchdog::heartbeat`] once per cycle. A check loop running at a fixed
//! period flags any task whose last heartbeat is older than its timeout and
//! hands `(name, elapsed)` to a pluggable fault handler. The watchdog only
//! detects; recovery belongs to whoever installs the handler.
//!
//! ## Detection rules
//!
//! - A task that has never sent a heartbeat is never flagged.
//! - A stall fires the handler once per timeout window: after firing, the
//!   task's last heartbeat is reset to the detection time.
//! - Heartbeats for unknown names are logged and ignored.
//!
//! ## Example
//!
//! ```rust
//! use autohaul_watchdog::prelude::*;
//! use std::time::{Duration, Instant};
//!
//! let watchdog = Watchdog::new(WatchdogConfig::default());
//! watchdog.register_task("navigation", Duration::from_millis(100));
//! watchdog.heartbeat("navigation");
//!
//! let stalled = watchdog.check_tasks_at(Instant::now() + Duration::from_millis(150));
//! assert_eq!(stalled, vec!["navigation".to_string()]);
//! assert_eq!(watchdog.fault_count(), 1);
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod health;
pub mod watchdog;

pub mod prelude;

pub use error::{WatchdogError, WatchdogResult};
pub use health::{HealthStatus, TaskHealthRecord};
pub use watchdog::{FaultHandler, Watchdog, WatchdogConfig, WatchdogConfigBuilder};
