//! Linux-specific priority elevation.
#![expect(unsafe_code, reason = "pthread scheduling calls are FFI")]

use crate::error::{SchedError, SchedResult};
use crate::priority::TaskPriority;
use libc::{SCHED_FIFO, pthread_self, pthread_setschedparam, sched_param};

/// Switch the calling thread to `SCHED_FIFO` at the level for `priority`.
pub(crate) fn elevate_current_thread(priority: TaskPriority) -> SchedResult<()> {
    let param = sched_param {
        sched_priority: priority.fifo_level(),
    };

    // SAFETY: pthread_self has no preconditions and always returns the caller's handle.
    let thread = unsafe { pthread_self() };

    // SAFETY: `thread` is the live calling thread and `param` outlives the call.
    let code = unsafe { pthread_setschedparam(thread, SCHED_FIFO, &param) };

    if code == 0 {
        Ok(())
    } else {
        Err(SchedError::elevation_failed(priority, code))
    }
}
