// CLASSIFICATION: COMMUNITY
// Filename: branch_trace.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

mod support;

use std::sync::atomic::Ordering;

use espresso_kernel::config::Settings;
use espresso_kernel::cpu::Core;
use support::Harness;

fn traced() -> Settings {
    let mut settings = Settings::default();
    settings.log.branch_trace = true;
    settings
}

#[test]
fn disabled_trace_installs_no_handler() {
    let h = Harness::new(None);
    h.kernel.start().unwrap();
    assert!(!h.kernel.branch_trace_enabled());
    assert!(h.cpu.inner.branch_trace_handler().is_none());
    h.shutdown();
}

#[test]
fn enabled_trace_resolves_symbols() {
    let h = Harness::with_settings(traced(), None);
    h.kernel.start().unwrap();
    assert!(h.kernel.branch_trace_enabled());

    let handler = h.cpu.inner.branch_trace_handler().unwrap();
    let core = Core::new(0);
    handler(&core, 0x0200_0010);
    handler(&core, 0x0100_0000);
    assert_eq!(h.symbols.lookups.load(Ordering::SeqCst), 2);
    h.shutdown();
}

#[test]
fn toggling_installs_handler_once() {
    let h = Harness::new(None);
    h.kernel.start().unwrap();

    h.config.set(traced());
    assert!(h.kernel.branch_trace_enabled());
    h.config.set(Settings::default());
    assert!(!h.kernel.branch_trace_enabled());
    h.config.set(traced());
    assert!(h.kernel.branch_trace_enabled());
    assert_eq!(h.cpu.inner.branch_trace_installs(), 1);

    // Disabled tracing leaves the handler in place but silent.
    h.config.set(Settings::default());
    let handler = h.cpu.inner.branch_trace_handler().unwrap();
    handler(&Core::new(2), 0x0200_0000);
    assert_eq!(h.symbols.lookups.load(Ordering::SeqCst), 0);
    h.shutdown();
}

#[test]
fn config_listener_is_registered_once() {
    let h = Harness::new(None);
    h.kernel.start().unwrap();
    let _ = h.kernel.start();
    assert_eq!(h.config.listener_count(), 1);
    h.shutdown();
}

#[test]
fn unknown_system_calls_go_to_hle() {
    let h = Harness::new(None);
    *h.hle.redirect.lock().unwrap() = Some(2);
    h.kernel.start().unwrap();

    let handler = h.cpu.inner.unknown_system_call_handler().unwrap();
    assert_eq!(handler(&Core::new(1), 0x7E00), Some(2));
    assert_eq!(*h.hle.calls.lock().unwrap(), vec![(1, 0x7E00)]);
    h.shutdown();
}
