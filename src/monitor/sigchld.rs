/*!
 * SIGCHLD Watcher
 * Process-wide child-termination hook with self-pipe handoff
 *
 * The signal context executes only signal-hook's async-signal-safe pipe
 * write. Reaping and handler lookup happen on the watcher thread.
 */

use super::manager::ExitMonitor;
use crate::core::errors::MonitorResult;
use log::{error, info};
use signal_hook::consts::signal::SIGCHLD;
use signal_hook::low_level::pipe;
use std::io::Read;
use std::os::unix::net::UnixStream;
use std::sync::Arc;
use std::thread;

/// Name of the watcher thread
pub(crate) const WATCHER_THREAD_NAME: &str = "sigchld-watch";

/// Install the process-wide SIGCHLD hook and start the watcher thread
///
/// Called once for the process lifetime; there is no teardown path. One
/// wakeup byte may stand for several coalesced signals, so every wakeup
/// triggers a full drain pass.
pub(crate) fn install(monitor: Arc<ExitMonitor>) -> MonitorResult<()> {
    let (mut reader, writer) = UnixStream::pair()?;

    // Ownership of the write end moves into the signal registration and
    // stays alive for the rest of the process.
    pipe::register(SIGCHLD, writer)?;

    // Process-lifetime thread; the handle is never joined.
    let _ = thread::Builder::new()
        .name(WATCHER_THREAD_NAME.to_string())
        .spawn(move || {
            let mut buf = [0u8; 64];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => {
                        error!("SIGCHLD pipe closed; watcher exiting");
                        break;
                    }
                    Ok(_) => monitor.drain_and_dispatch(),
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        error!("SIGCHLD pipe read failed: {}", e);
                        break;
                    }
                }
            }
        })?;

    info!("SIGCHLD watcher installed");
    Ok(())
}
