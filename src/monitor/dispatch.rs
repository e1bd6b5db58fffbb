/*!
 * Exit Dispatch Executor
 * Single designated thread that runs completion handlers in order
 */

use super::registry::ExitHandlerFn;
use crate::core::errors::MonitorResult;
use crate::core::types::{ExitCode, Pid};
use log::{debug, error, info};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;

/// Name of the designated dispatch thread
pub const DISPATCH_THREAD_NAME: &str = "exit-dispatch";

/// Check whether the current thread is the designated dispatch thread
#[inline]
pub fn is_dispatch_thread() -> bool {
    thread::current().name() == Some(DISPATCH_THREAD_NAME)
}

/// One scheduled handler invocation
pub(crate) struct DispatchJob {
    pub pid: Pid,
    pub code: ExitCode,
    pub handler: ExitHandlerFn,
}

/// Serialized executor for completion handlers
///
/// Handlers run on a single named thread in scheduling order. The queue is
/// unbounded, so `schedule` never blocks and is safe to call from any
/// context. A panicking handler is isolated and never prevents later
/// deliveries.
pub struct ExitExecutor {
    tx: flume::Sender<DispatchJob>,
}

impl ExitExecutor {
    /// Start the dispatch thread
    pub fn start() -> MonitorResult<Self> {
        let (tx, rx) = flume::unbounded::<DispatchJob>();

        let _ = thread::Builder::new()
            .name(DISPATCH_THREAD_NAME.to_string())
            .spawn(move || {
                for job in rx.iter() {
                    let DispatchJob { pid, code, handler } = job;
                    debug!("Running exit handler for PID {} (code {})", pid, code);
                    if catch_unwind(AssertUnwindSafe(move || handler(code))).is_err() {
                        error!("Exit handler for PID {} panicked", pid);
                    }
                }
                info!("Exit dispatch thread stopped");
            })?;

        Ok(Self { tx })
    }

    /// Schedule a handler invocation (fire-and-forget)
    pub(crate) fn schedule(&self, job: DispatchJob) {
        let pid = job.pid;
        if self.tx.send(job).is_err() {
            error!("Dispatch queue closed; dropping exit handler for PID {}", pid);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    fn job(pid: Pid, code: ExitCode, sink: mpsc::Sender<(Pid, ExitCode, bool)>) -> DispatchJob {
        DispatchJob {
            pid,
            code,
            handler: Box::new(move |code| {
                sink.send((pid, code, is_dispatch_thread())).unwrap();
            }),
        }
    }

    #[test]
    fn test_handlers_run_in_order_on_dispatch_thread() {
        let executor = ExitExecutor::start().unwrap();
        let (tx, rx) = mpsc::channel();

        executor.schedule(job(1, 10, tx.clone()));
        executor.schedule(job(2, 20, tx.clone()));
        executor.schedule(job(3, 30, tx));

        for expected in [(1, 10), (2, 20), (3, 30)] {
            let (pid, code, on_dispatch) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            assert_eq!((pid, code), expected);
            assert!(on_dispatch);
        }
    }

    #[test]
    fn test_panicking_handler_is_isolated() {
        let executor = ExitExecutor::start().unwrap();
        let (tx, rx) = mpsc::channel();

        executor.schedule(DispatchJob {
            pid: 9,
            code: 1,
            handler: Box::new(|_| panic!("handler failure")),
        });
        executor.schedule(job(10, 0, tx));

        let (pid, code, _) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!((pid, code), (10, 0));
    }
}
