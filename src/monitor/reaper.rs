/*!
 * Child Reaper
 * Non-blocking collection of terminated children via waitpid
 */

use super::types::ExitEvent;
use crate::core::types::Pid;
use log::{debug, warn};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};

/// Outcome of one non-blocking reap attempt
#[derive(Debug)]
pub(crate) enum ReapOutcome {
    /// A child terminated and its OS resources have been released
    Child(ExitEvent),
    /// Children exist but none have terminated right now
    Drained,
    /// No children at all (expected empty state)
    NoChildren,
    /// Unexpected reap failure; the drain pass should be abandoned
    Failed(Errno),
}

/// Reap the next terminated child without blocking
///
/// Stopped and continued children are not terminations and are skipped.
pub(crate) fn reap_next() -> ReapOutcome {
    loop {
        match waitpid(nix::unistd::Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::Exited(pid, code)) => {
                return ReapOutcome::Child(ExitEvent::new(pid.as_raw() as Pid, code));
            }
            Ok(WaitStatus::Signaled(pid, signal, _)) => {
                // Shell convention for deaths by signal
                return ReapOutcome::Child(ExitEvent::new(
                    pid.as_raw() as Pid,
                    128 + signal as i32,
                ));
            }
            Ok(WaitStatus::StillAlive) => return ReapOutcome::Drained,
            Ok(status) => {
                debug!("Skipping non-terminal child status: {:?}", status);
            }
            Err(Errno::ECHILD) => return ReapOutcome::NoChildren,
            Err(errno) => {
                warn!("Wait call failed: {}", errno);
                return ReapOutcome::Failed(errno);
            }
        }
    }
}
