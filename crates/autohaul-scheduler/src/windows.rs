//! Windows-specific priority elevation.
#![expect(unsafe_code, reason = "Win32 thread priority calls are FFI")]

use crate::error::{SchedError, SchedResult};
use crate::priority::TaskPriority;
use windows::Win32::System::Threading::{
    GetCurrentThread, SetThreadPriority, THREAD_PRIORITY, THREAD_PRIORITY_ABOVE_NORMAL,
    THREAD_PRIORITY_HIGHEST, THREAD_PRIORITY_NORMAL, THREAD_PRIORITY_TIME_CRITICAL,
};

fn thread_priority(priority: TaskPriority) -> THREAD_PRIORITY {
    match priority {
        TaskPriority::Lowest => THREAD_PRIORITY_NORMAL,
        TaskPriority::Medium => THREAD_PRIORITY_ABOVE_NORMAL,
        TaskPriority::High => THREAD_PRIORITY_HIGHEST,
        TaskPriority::Highest => THREAD_PRIORITY_TIME_CRITICAL,
    }
}

/// Raise the calling thread's priority level.
pub(crate) fn elevate_current_thread(priority: TaskPriority) -> SchedResult<()> {
    // SAFETY: GetCurrentThread returns a pseudo-handle that needs no cleanup.
    let thread = unsafe { GetCurrentThread() };

    // SAFETY: `thread` is the pseudo-handle for the calling thread.
    unsafe { SetThreadPriority(thread, thread_priority(priority)) }
        .map_err(|e| SchedError::elevation_failed(priority, e.code().0))
}
