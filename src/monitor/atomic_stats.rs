/*!
 * Lock-Free Monitor Statistics
 * Atomic counters for zero-contention stats tracking in hot paths
 */

use super::types::ExitStats;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic monitor statistics for lock-free updates
///
/// # Performance
/// - Cache-line aligned to prevent false sharing
/// - All operations use relaxed ordering
/// - Read-only snapshot requires no synchronization
#[repr(C, align(64))]
pub struct AtomicExitStats {
    handlers_registered: AtomicU64,
    children_reaped: AtomicU64,
    handlers_dispatched: AtomicU64,
    unregistered_reaps: AtomicU64,
    orphans_swept: AtomicU64,
}

impl AtomicExitStats {
    /// Create new atomic stats
    #[inline]
    pub const fn new() -> Self {
        Self {
            handlers_registered: AtomicU64::new(0),
            children_reaped: AtomicU64::new(0),
            handlers_dispatched: AtomicU64::new(0),
            unregistered_reaps: AtomicU64::new(0),
            orphans_swept: AtomicU64::new(0),
        }
    }

    /// Increment registered handlers (lock-free)
    #[inline(always)]
    pub fn inc_registered(&self) {
        self.handlers_registered.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment reaped children (lock-free)
    #[inline(always)]
    pub fn inc_reaped(&self) {
        self.children_reaped.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment dispatched handlers (lock-free)
    #[inline(always)]
    pub fn inc_dispatched(&self) {
        self.handlers_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment reaps with no registered handler (lock-free)
    #[inline(always)]
    pub fn inc_unregistered(&self) {
        self.unregistered_reaps.fetch_add(1, Ordering::Relaxed);
    }

    /// Add swept orphan count (lock-free)
    #[inline(always)]
    pub fn add_orphans_swept(&self, count: u64) {
        self.orphans_swept.fetch_add(count, Ordering::Relaxed);
    }

    /// Get a read-only snapshot
    pub fn snapshot(&self) -> ExitStats {
        ExitStats {
            handlers_registered: self.handlers_registered.load(Ordering::Relaxed),
            children_reaped: self.children_reaped.load(Ordering::Relaxed),
            handlers_dispatched: self.handlers_dispatched.load(Ordering::Relaxed),
            unregistered_reaps: self.unregistered_reaps.load(Ordering::Relaxed),
            orphans_swept: self.orphans_swept.load(Ordering::Relaxed),
        }
    }
}

impl Default for AtomicExitStats {
    fn default() -> Self {
        Self::new()
    }
}
