/*!
 * Handler Registry
 * Pending completion handlers keyed by child pid
 */

use crate::core::types::{ExitCode, Pid};
use ahash::RandomState;
use dashmap::DashMap;
use log::{debug, warn};
use std::time::{Duration, Instant};

/// Completion handler invoked once with the child's exit code
pub type ExitHandlerFn = Box<dyn FnOnce(ExitCode) + Send + Sync + 'static>;

/// A registered handler waiting for its process to terminate
struct PendingHandler {
    handler: ExitHandlerFn,
    registered_at: Instant,
}

/// Pending handler registry
///
/// At most one handler is pending per live pid. Removal and retrieval are a
/// single atomic operation so two racing drain passes can never double-invoke
/// or double-clear an entry.
pub struct HandlerRegistry {
    handlers: DashMap<Pid, PendingHandler, RandomState>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Register a handler for a pid, replacing any previous registration
    pub fn register<F>(&self, pid: Pid, handler: F)
    where
        F: FnOnce(ExitCode) + Send + Sync + 'static,
    {
        let entry = PendingHandler {
            handler: Box::new(handler),
            registered_at: Instant::now(),
        };

        if self.handlers.insert(pid, entry).is_some() {
            warn!("Replaced pending exit handler for PID {}", pid);
        } else {
            debug!("Registered exit handler for PID {}", pid);
        }
    }

    /// Atomically remove and return the handler for a pid
    pub fn take(&self, pid: Pid) -> Option<ExitHandlerFn> {
        self.handlers.remove(&pid).map(|(_, entry)| {
            debug!("Took exit handler for PID {}", pid);
            entry.handler
        })
    }

    /// Check whether a pid has a pending handler
    pub fn contains(&self, pid: Pid) -> bool {
        self.handlers.contains_key(&pid)
    }

    /// Get pending handler count
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Drop entries older than `grace` whose pid fails the liveness probe
    ///
    /// Candidates are collected first and removed one by one, so a reap
    /// racing the sweep wins and the handler still fires.
    pub fn sweep_orphans<P>(&self, grace: Duration, probe: P) -> usize
    where
        P: Fn(Pid) -> bool,
    {
        let now = Instant::now();
        let stale: Vec<Pid> = self
            .handlers
            .iter()
            .filter(|entry| now.duration_since(entry.value().registered_at) >= grace)
            .map(|entry| *entry.key())
            .collect();

        let mut swept = 0;
        for pid in stale {
            if probe(pid) {
                continue;
            }
            if self.handlers.remove(&pid).is_some() {
                warn!(
                    "Dropped orphaned exit handler for PID {}: process already reaped elsewhere",
                    pid
                );
                swept += 1;
            }
        }
        swept
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
