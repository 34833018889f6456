//! Derivative naming.
//!
//! Every derivative is named `{nanoseconds}{ext}`: the wall-clock time in
//! nanoseconds since the Unix epoch followed by the original extension,
//! verbatim (e.g. `1718031234567890123.jpg`).
//!
//! The allocator never hands out the same timestamp twice within a process:
//! if the clock has not advanced past the last issued value, the next value is
//! `last + 1`. Processes sharing one content root can still collide, since
//! nothing checks the filesystem.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

/// Source of wall-clock time in nanoseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_nanos(&self) -> u64;
}

/// [`Clock`] reading [`SystemTime::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_nanos(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}

/// Allocates unique derivative filenames.
pub struct IdentityAllocator {
    clock: Arc<dyn Clock>,
    last_issued: AtomicU64,
}

impl IdentityAllocator {
    /// Create an allocator on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an allocator on a custom clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last_issued: AtomicU64::new(0),
        }
    }

    /// Allocate a filename for a derivative of a file with extension `ext`.
    ///
    /// `ext` includes its leading `.` (or is empty) and is used verbatim.
    pub fn allocate(&self, ext: &str) -> String {
        format!("{}{}", self.next_timestamp(), ext)
    }

    fn next_timestamp(&self) -> u64 {
        let now = self.clock.now_nanos();
        let next = |last: u64| now.max(last.saturating_add(1));

        let previous = self
            .last_issued
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| Some(next(last)))
            .unwrap_or_else(|previous| previous);

        let issued = next(previous);
        if issued != now {
            debug!(clock = now, issued, "Clock did not advance, bumped timestamp");
        }
        issued
    }
}

impl Default for IdentityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IdentityAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityAllocator")
            .field("last_issued", &self.last_issued.load(Ordering::Relaxed))
            .finish()
    }
}
