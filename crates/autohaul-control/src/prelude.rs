//! Prelude for autohaul-control.

pub use crate::command_logic::{CommandLogic, CycleEvents};
pub use crate::config::{
    CommandLogicConfig, ControlConfig, FaultMonitorConfig, FaultThresholds, NavigationConfig,
};
pub use crate::error::{ControlError, ControlResult};
pub use crate::fault_monitor::{FaultEvent, FaultMonitor};
pub use crate::navigation::{NavMode, NavigationControl};
pub use crate::services::TaskServices;
pub use crate::system::ControlSystem;
