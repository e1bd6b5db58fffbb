/*!
 * Exit Dispatch Tests
 * Simulated exit delivery through the public dispatch seam
 */

use exit_monitor::{is_dispatch_thread, ExitEvent, ExitMonitor, MonitorConfig};
use pretty_assertions::assert_eq;
use std::sync::mpsc;
use std::time::Duration;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

fn new_monitor() -> ExitMonitor {
    ExitMonitor::new(MonitorConfig::default().with_sweep_orphans(false))
        .expect("monitor construction failed")
}

#[test]
fn test_single_delivery() {
    let monitor = new_monitor();
    let (tx, rx) = mpsc::channel();

    monitor.register(100, move |code| tx.send(code).unwrap());
    monitor.dispatch_exits(&[ExitEvent::new(100, 0)]);

    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), 0);
    assert!(!monitor.has_handler(100));

    // A second reap of the same pid finds nothing to deliver
    monitor.dispatch_exits(&[ExitEvent::new(100, 0)]);
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    assert_eq!(monitor.stats().handlers_dispatched, 1);
}

#[test]
fn test_unregistered_pid_is_dropped_silently() {
    let monitor = new_monitor();

    monitor.dispatch_exits(&[ExitEvent::new(200, 1)]);
    assert_eq!(monitor.stats().unregistered_reaps, 1);

    // The dispatcher is still fully functional afterwards
    let (tx, rx) = mpsc::channel();
    monitor.register(201, move |code| tx.send(code).unwrap());
    monitor.dispatch_exits(&[ExitEvent::new(201, 3)]);
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), 3);
}

#[test]
fn test_unregistered_pid_mid_pass_does_not_affect_others() {
    let monitor = new_monitor();
    let (tx, rx) = mpsc::channel();

    let first = tx.clone();
    monitor.register(300, move |_| first.send(300).unwrap());
    let second = tx;
    monitor.register(302, move |_| second.send(302).unwrap());

    monitor.dispatch_exits(&[
        ExitEvent::new(300, 0),
        ExitEvent::new(301, 0),
        ExitEvent::new(302, 0),
    ]);

    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), 300);
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), 302);
    assert_eq!(monitor.stats().unregistered_reaps, 1);
}

#[test]
fn test_order_within_one_pass() {
    let monitor = new_monitor();
    let (tx, rx) = mpsc::channel();

    for pid in [300u32, 301] {
        let tx = tx.clone();
        monitor.register(pid, move |_| tx.send(pid).unwrap());
    }

    monitor.dispatch_exits(&[ExitEvent::new(300, 0), ExitEvent::new(301, 0)]);

    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), 300);
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), 301);
}

#[test]
fn test_coalesced_trigger_delivers_every_exit() {
    let monitor = new_monitor();
    let (tx, rx) = mpsc::channel();

    let events: Vec<ExitEvent> = (500u32..505)
        .map(|pid| {
            let tx = tx.clone();
            monitor.register(pid, move |code| tx.send((pid, code)).unwrap());
            ExitEvent::new(pid, pid as i32 - 500)
        })
        .collect();

    monitor.dispatch_exits(&events);

    for expected_pid in 500u32..505 {
        let (pid, code) = rx.recv_timeout(RECV_TIMEOUT).unwrap();
        assert_eq!(pid, expected_pid);
        assert_eq!(code, pid as i32 - 500);
    }
    assert_eq!(monitor.pending(), 0);
    assert_eq!(monitor.stats().handlers_dispatched, 5);
}

#[test]
fn test_handlers_run_only_on_dispatch_thread() {
    let monitor = new_monitor();
    let (tx, rx) = mpsc::channel();

    assert!(!is_dispatch_thread());

    monitor.register(700, move |_| tx.send(is_dispatch_thread()).unwrap());
    monitor.dispatch_exits(&[ExitEvent::new(700, 0)]);

    assert!(rx.recv_timeout(RECV_TIMEOUT).unwrap());
}

#[test]
fn test_panicking_handler_does_not_block_later_deliveries() {
    let monitor = new_monitor();
    let (tx, rx) = mpsc::channel();

    monitor.register(800, |_| panic!("boom"));
    monitor.register(801, move |code| tx.send(code).unwrap());

    monitor.dispatch_exits(&[ExitEvent::new(800, 1), ExitEvent::new(801, 2)]);

    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), 2);
}
