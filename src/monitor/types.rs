/*!
 * Monitor Types
 * Exit events, configuration, and statistics snapshots
 */

use crate::core::types::{ExitCode, Pid};
use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One reaped child termination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitEvent {
    pub pid: Pid,
    pub code: ExitCode,
}

impl ExitEvent {
    pub fn new(pid: Pid, code: ExitCode) -> Self {
        Self { pid, code }
    }
}

/// Monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MonitorConfig {
    /// Drop registrations whose process no longer exists
    pub sweep_orphans: bool,
    /// Minimum time between orphan sweeps
    pub sweep_interval: Duration,
    /// Minimum registration age before an entry is eligible for sweeping
    pub orphan_grace: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sweep_orphans: true,
            sweep_interval: Duration::from_secs(60),
            orphan_grace: Duration::from_secs(300),
        }
    }
}

impl MonitorConfig {
    /// Build configuration from environment variables
    ///
    /// Environment variables:
    /// - EXIT_MONITOR_SWEEP_SECS: seconds between orphan sweeps (0 disables)
    /// - EXIT_MONITOR_GRACE_SECS: minimum registration age before sweeping
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("EXIT_MONITOR_SWEEP_SECS") {
            match value.parse::<u64>() {
                Ok(0) => config.sweep_orphans = false,
                Ok(secs) => config.sweep_interval = Duration::from_secs(secs),
                Err(_) => warn!("Ignoring invalid EXIT_MONITOR_SWEEP_SECS: {}", value),
            }
        }

        if let Ok(value) = std::env::var("EXIT_MONITOR_GRACE_SECS") {
            match value.parse::<u64>() {
                Ok(secs) => config.orphan_grace = Duration::from_secs(secs),
                Err(_) => warn!("Ignoring invalid EXIT_MONITOR_GRACE_SECS: {}", value),
            }
        }

        config
    }

    /// Enable or disable the orphan sweep
    pub fn with_sweep_orphans(mut self, enabled: bool) -> Self {
        self.sweep_orphans = enabled;
        self
    }

    /// Set the minimum time between orphan sweeps
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Set the minimum registration age before an entry can be swept
    pub fn with_orphan_grace(mut self, grace: Duration) -> Self {
        self.orphan_grace = grace;
        self
    }
}

/// Monitor statistics snapshot
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExitStats {
    pub handlers_registered: u64,
    pub children_reaped: u64,
    pub handlers_dispatched: u64,
    pub unregistered_reaps: u64,
    pub orphans_swept: u64,
}
