/*!
 * Error Types
 * Centralized error handling with thiserror
 */

use nix::errno::Errno;
use thiserror::Error;

/// Monitor operation result
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Exit monitor errors
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Installation failed: {0}")]
    Install(#[from] std::io::Error),

    #[error("Reap failed: {0}")]
    Reap(Errno),
}
