/*!
 * Exit Monitor Library
 * Child process exit notification: SIGCHLD-driven reaping with ordered
 * completion-handler dispatch on a single designated thread
 */

pub mod core;
pub mod monitor;

// Re-exports
pub use crate::core::errors::{MonitorError, MonitorResult};
pub use crate::core::types::{ExitCode, Pid};
pub use crate::monitor::{
    init, init_with_config, is_dispatch_thread, monitor, ExitEvent, ExitHandlerFn, ExitMonitor,
    ExitStats, HandlerRegistry, MonitorConfig, DISPATCH_THREAD_NAME,
};
