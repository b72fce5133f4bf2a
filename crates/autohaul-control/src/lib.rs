//! # autohaul-control
//!
//! The three control loops of the Autohaul truck and the wiring between them.
//!
//! ```text
//!  sensor producer ──write──▶ SharedSensorChannel
//!                                 │ peek_latest
//!         ┌───────────────────────┼────────────────────────┐
//!         ▼                       ▼                        ▼
//!   FaultMonitor          NavigationControl  ──output──▶ CommandLogic ──▶ actuators
//!   (highest, 100 ms)     (medium, 50 ms)   ◀──state──  (high, 50 ms)
//! ```
//!
//! - [`FaultMonitor`] classifies the newest reading and reports changes.
//! - [`NavigationControl`] steers towards the current setpoint.
//! - [`CommandLogic`] owns the truck state: it latches faults, applies
//!   operator commands and decides the actuator output.
//!
//! Every loop runs on an [`autohaul_scheduler::PeriodicTask`], sends a
//! heartbeat to the [`autohaul_watchdog::Watchdog`] and is timed by the
//! [`autohaul_perf::PerformanceMonitor`] once per cycle. [`ControlSystem`]
//! builds and starts the whole set from one [`ControlConfig`].
//!
//! ## Lock discipline
//!
//! Each component guards its state with one lock and never calls into
//! another component while holding it. Command logic reads the navigation
//! output before taking its own lock and pushes the truck state after
//! releasing it.
//!
//! ## Example
//!
//! ```rust
//! use autohaul_control::prelude::*;
//! use autohaul_types::{OperatorCommand, SensorReading};
//!
//! let config = ControlConfig::builder().elevate_priorities(false).build()?;
//! let system = ControlSystem::new(config)?;
//!
//! system.publish_reading(SensorReading { temperature_c: 130, ..SensorReading::default() });
//! system.set_command(OperatorCommand::drive(60, 0, 0));
//! system.step();
//!
//! assert!(system.state().fault);
//! assert_eq!(system.actuator_output().velocity, 0);
//! # Ok::<(), ControlError>(())
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    missing_docs,
    missing_debug_implementations
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod command_logic;
pub mod config;
pub mod error;
pub mod fault_monitor;
pub mod navigation;
pub mod services;
pub mod system;

pub mod prelude;

pub use command_logic::{COMMAND_LOGIC_TASK, CommandLogic, CommandState, CycleEvents};
pub use config::{
    CommandLogicConfig, ControlConfig, ControlConfigBuilder, FaultMonitorConfig, FaultThresholds,
    NavigationConfig,
};
pub use error::{ControlError, ControlResult};
pub use fault_monitor::{FAULT_MONITOR_TASK, FaultCallback, FaultEvent, FaultMonitor};
pub use navigation::{NAVIGATION_TASK, NavMode, NavState, NavStep, NavigationControl};
pub use services::TaskServices;
pub use system::ControlSystem;
