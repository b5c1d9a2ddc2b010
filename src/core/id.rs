/*!
 * ID Generation
 * Per-run process ID allocation
 */

use super::types::Pid;
use std::sync::atomic::{AtomicU32, Ordering};

/// Monotonic PID allocator
///
/// Owned by a single simulation run, so two runs (e.g. concurrent tests)
/// never share a counter. IDs are handed out in creation order and are
/// never recycled.
#[repr(C, align(64))]
#[derive(Debug, Default)]
pub struct PidAllocator {
    counter: AtomicU32,
}

impl PidAllocator {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create an allocator whose first ID is `first`
    pub fn starting_at(first: Pid) -> Self {
        Self {
            counter: AtomicU32::new(first),
        }
    }

    /// Allocate the next PID
    #[inline]
    pub fn next(&self) -> Pid {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Peek at the next PID without consuming it
    #[inline]
    pub fn peek(&self) -> Pid {
        self.counter.load(Ordering::Relaxed)
    }
}
