/*!
 * Exit Monitor
 * Central coordinator: drain passes, handler lookup, and dispatch
 */

use super::atomic_stats::AtomicExitStats;
use super::dispatch::{DispatchJob, ExitExecutor};
use super::reaper::{self, ReapOutcome};
use super::registry::HandlerRegistry;
use super::sigchld;
use super::types::{ExitEvent, ExitStats, MonitorConfig};
use crate::core::errors::{MonitorError, MonitorResult};
use crate::core::types::{ExitCode, Pid};
use log::{debug, error, info};
use nix::errno::Errno;
use nix::sys::signal::kill;
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

/// Global monitor instance (installed once, never torn down)
static GLOBAL_MONITOR: OnceLock<Arc<ExitMonitor>> = OnceLock::new();

/// Serializes first-time installation of the SIGCHLD hook
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Initialize the global monitor with configuration from the environment
///
/// The first call installs the process-wide SIGCHLD hook; later calls
/// return the existing instance.
pub fn init() -> MonitorResult<&'static Arc<ExitMonitor>> {
    init_with_config(MonitorConfig::from_env())
}

/// Initialize the global monitor with explicit configuration
pub fn init_with_config(config: MonitorConfig) -> MonitorResult<&'static Arc<ExitMonitor>> {
    let _guard = INIT_LOCK.lock();

    if let Some(existing) = GLOBAL_MONITOR.get() {
        return Ok(existing);
    }

    let monitor = Arc::new(ExitMonitor::new(config)?);
    sigchld::install(Arc::clone(&monitor))?;

    Ok(GLOBAL_MONITOR.get_or_init(|| monitor))
}

/// Get the global monitor if initialized
#[inline]
pub fn monitor() -> Option<&'static Arc<ExitMonitor>> {
    GLOBAL_MONITOR.get()
}

/// Child exit monitor
///
/// Owns the pending handler registry and the dispatch executor. The
/// SIGCHLD watcher triggers `drain_and_dispatch` on every child state
/// change; collaborators only ever call `register`.
pub struct ExitMonitor {
    registry: HandlerRegistry,
    executor: ExitExecutor,
    stats: AtomicExitStats,
    config: MonitorConfig,
    last_sweep: Mutex<Instant>,
}

impl ExitMonitor {
    /// Create a monitor without installing the process-wide SIGCHLD hook
    ///
    /// Exit events can be fed in directly through `dispatch_exits`; the
    /// global `init` path wires reaping up to real SIGCHLD delivery.
    pub fn new(config: MonitorConfig) -> MonitorResult<Self> {
        let monitor = Self {
            registry: HandlerRegistry::new(),
            executor: ExitExecutor::start()?,
            stats: AtomicExitStats::new(),
            last_sweep: Mutex::new(Instant::now()),
            config,
        };
        info!("Exit monitor initialized");
        Ok(monitor)
    }

    /// Register a completion handler for a spawned child
    ///
    /// Call immediately after obtaining the child's pid, before the pid can
    /// be reaped elsewhere. A second registration for the same pid replaces
    /// the first. Never blocks and never fails; the handler fires exactly
    /// once on the dispatch thread when the child terminates.
    pub fn register<F>(&self, pid: Pid, handler: F)
    where
        F: FnOnce(ExitCode) + Send + Sync + 'static,
    {
        self.registry.register(pid, handler);
        self.stats.inc_registered();
    }

    /// Check whether a pid still has a pending handler
    pub fn has_handler(&self, pid: Pid) -> bool {
        self.registry.contains(pid)
    }

    /// Get pending handler count
    pub fn pending(&self) -> usize {
        self.registry.len()
    }

    /// Get operational counters snapshot
    pub fn stats(&self) -> ExitStats {
        self.stats.snapshot()
    }

    /// Deliver exit events to their registered handlers, preserving order
    ///
    /// Events without a registered handler are dropped silently; unrelated
    /// code may also be reaping children. This is the injection point the
    /// SIGCHLD drain pass feeds, and it accepts simulated events directly.
    pub fn dispatch_exits(&self, exits: &[ExitEvent]) {
        for event in exits {
            self.dispatch_exit(*event);
        }
    }

    fn dispatch_exit(&self, event: ExitEvent) {
        match self.registry.take(event.pid) {
            Some(handler) => {
                self.executor.schedule(DispatchJob {
                    pid: event.pid,
                    code: event.code,
                    handler,
                });
                self.stats.inc_dispatched();
            }
            None => {
                debug!("No handler registered for reaped PID {}", event.pid);
                self.stats.inc_unregistered();
            }
        }
    }

    /// One full drain pass: reap every currently-terminated child
    ///
    /// A single trigger can stand for several coalesced terminations, so
    /// the pass loops until the reap primitive reports nothing left.
    pub(crate) fn drain_and_dispatch(&self) {
        loop {
            match reaper::reap_next() {
                ReapOutcome::Child(event) => {
                    debug!("Reaped PID {} (code {})", event.pid, event.code);
                    self.stats.inc_reaped();
                    self.dispatch_exit(event);
                }
                ReapOutcome::Drained | ReapOutcome::NoChildren => break,
                ReapOutcome::Failed(errno) => {
                    error!("Abandoning drain pass: {}", MonitorError::Reap(errno));
                    break;
                }
            }
        }

        self.maybe_sweep();
    }

    /// Drop registrations whose process was reaped outside this subsystem
    fn maybe_sweep(&self) {
        if !self.config.sweep_orphans {
            return;
        }

        {
            let mut last = self.last_sweep.lock();
            if last.elapsed() < self.config.sweep_interval {
                return;
            }
            *last = Instant::now();
        }

        let swept = self
            .registry
            .sweep_orphans(self.config.orphan_grace, process_exists);
        if swept > 0 {
            self.stats.add_orphans_swept(swept as u64);
        }
    }
}

/// Liveness probe for the orphan sweep
///
/// A zombie still probes alive, so only pids fully reaped elsewhere fail.
fn process_exists(pid: Pid) -> bool {
    !matches!(
        kill(nix::unistd::Pid::from_raw(pid as i32), None),
        Err(Errno::ESRCH)
    )
}
