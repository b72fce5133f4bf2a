//! Fallback for platforms without a real-time scheduling class.

use crate::error::{SchedError, SchedResult};
use crate::priority::TaskPriority;

pub(crate) fn elevate_current_thread(_priority: TaskPriority) -> SchedResult<()> {
    Err(SchedError::Unsupported)
}
