/*!
 * Monitor Module
 * SIGCHLD-driven child exit monitoring and handler dispatch
 */

mod atomic_stats;
mod dispatch;
mod manager;
mod reaper;
mod registry;
mod sigchld;
pub mod types;

// Re-export public API
pub use dispatch::{is_dispatch_thread, DISPATCH_THREAD_NAME};
pub use manager::{init, init_with_config, monitor, ExitMonitor};
pub use registry::{ExitHandlerFn, HandlerRegistry};
pub use types::{ExitEvent, ExitStats, MonitorConfig};
