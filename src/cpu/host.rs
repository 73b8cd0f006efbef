// CLASSIFICATION: COMMUNITY
// Filename: host.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Threaded [`Cpu`] with one host thread per physical core.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::thread::{self, JoinHandle};

use log::{debug, error};

use super::{
    BranchTraceHandler, Context, Core, CoreId, Cpu, CpuError, EntrypointHandler, InterruptFlags,
    UnknownSystemCallHandler, CORE_COUNT,
};
use crate::sync::{lock, with_lock};

/// A context switch observed by the cpu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextSwitch {
    pub core: CoreId,
    pub context: Option<Context>,
}

struct InterruptLine {
    pending: Mutex<InterruptFlags>,
    signal: Condvar,
}

impl InterruptLine {
    fn new() -> Self {
        Self {
            pending: Mutex::new(InterruptFlags::empty()),
            signal: Condvar::new(),
        }
    }
}

#[derive(Default)]
struct Handlers {
    entrypoint: Option<EntrypointHandler>,
    branch_trace: Option<BranchTraceHandler>,
    unknown_system_call: Option<UnknownSystemCallHandler>,
}

pub struct HostCpu {
    lines: Vec<InterruptLine>,
    halted: AtomicBool,
    started: AtomicBool,
    handlers: Mutex<Handlers>,
    threads: Mutex<Vec<JoinHandle<()>>>,
    switches: Mutex<Vec<ContextSwitch>>,
    branch_trace_installs: AtomicUsize,
}

impl HostCpu {
    pub fn new() -> Self {
        Self {
            lines: (0..CORE_COUNT).map(|_| InterruptLine::new()).collect(),
            halted: AtomicBool::new(false),
            started: AtomicBool::new(false),
            handlers: Mutex::new(Handlers::default()),
            threads: Mutex::new(Vec::new()),
            switches: Mutex::new(Vec::new()),
            branch_trace_installs: AtomicUsize::new(0),
        }
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    /// Installed branch trace handler, for the instruction engine to call.
    pub fn branch_trace_handler(&self) -> Option<BranchTraceHandler> {
        lock(&self.handlers).branch_trace.clone()
    }

    pub fn unknown_system_call_handler(&self) -> Option<UnknownSystemCallHandler> {
        lock(&self.handlers).unknown_system_call.clone()
    }

    /// How many times a branch trace handler has been installed.
    pub fn branch_trace_installs(&self) -> usize {
        self.branch_trace_installs.load(Ordering::Acquire)
    }

    /// Every context switch performed so far, in order.
    pub fn switches(&self) -> Vec<ContextSwitch> {
        lock(&self.switches).clone()
    }

    fn line(&self, core_id: CoreId) -> Option<&InterruptLine> {
        self.lines.get(core_id)
    }
}

impl Default for HostCpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu for HostCpu {
    fn set_core_entrypoint_handler(&self, handler: EntrypointHandler) {
        lock(&self.handlers).entrypoint = Some(handler);
    }

    fn set_branch_trace_handler(&self, handler: BranchTraceHandler) {
        lock(&self.handlers).branch_trace = Some(handler);
        self.branch_trace_installs.fetch_add(1, Ordering::AcqRel);
    }

    fn set_unknown_system_call_handler(&self, handler: UnknownSystemCallHandler) {
        lock(&self.handlers).unknown_system_call = Some(handler);
    }

    fn start(&self) -> Result<(), CpuError> {
        let entrypoint = lock(&self.handlers)
            .entrypoint
            .clone()
            .ok_or(CpuError::NoEntrypoint)?;
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(CpuError::AlreadyStarted);
        }

        let mut threads = lock(&self.threads);
        for id in 0..CORE_COUNT {
            let entrypoint = entrypoint.clone();
            let spawned = thread::Builder::new()
                .name(format!("core-{id}"))
                .spawn(move || {
                    let mut core = Core::new(id);
                    entrypoint(&mut core);
                });
            match spawned {
                Ok(handle) => threads.push(handle),
                Err(source) => {
                    drop(threads);
                    self.halt();
                    return Err(CpuError::Spawn { core: id, source });
                }
            }
            debug!("started thread for core {id}");
        }
        Ok(())
    }

    fn halt(&self) {
        self.halted.store(true, Ordering::Release);
        for line in &self.lines {
            // Taking the lock orders the store against a waiter's check.
            let _pending = lock(&line.pending);
            line.signal.notify_all();
        }
    }

    fn is_halted(&self) -> bool {
        HostCpu::is_halted(self)
    }

    fn join(&self) {
        let handles: Vec<_> = lock(&self.threads).drain(..).collect();
        for handle in handles {
            let name = handle.thread().name().unwrap_or("core").to_string();
            if handle.join().is_err() {
                error!("{name} thread panicked");
            }
        }
    }

    fn wait_for_interrupt(&self, core: &Core) -> InterruptFlags {
        let Some(line) = self.line(core.id) else {
            return InterruptFlags::empty();
        };
        let mut pending = lock(&line.pending);
        while pending.is_empty() && !self.is_halted() {
            pending = line
                .signal
                .wait(pending)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
        }
        std::mem::take(&mut *pending)
    }

    fn interrupt(&self, core_id: CoreId, flags: InterruptFlags) {
        if let Some(line) = self.line(core_id) {
            with_lock(&line.pending, |pending| pending.insert(flags));
            line.signal.notify_all();
        }
    }

    fn switch_context(&self, core: &mut Core, context: Option<Context>) {
        with_lock(&self.switches, |switches| {
            switches.push(ContextSwitch {
                core: core.id,
                context,
            })
        });
        if let Some(context) = context {
            core.nia = context.nia;
            core.cia = context.nia;
        }

        // Guest execution belongs to the instruction engine; hold the core
        // here until the machine halts.
        let Some(line) = self.line(core.id) else {
            return;
        };
        let mut pending = lock(&line.pending);
        while !self.is_halted() {
            pending = line
                .signal
                .wait(pending)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn start_requires_entrypoint() {
        let cpu = HostCpu::new();
        assert!(matches!(cpu.start(), Err(CpuError::NoEntrypoint)));
    }

    #[test]
    fn interrupt_wakes_parked_core() {
        let cpu = Arc::new(HostCpu::new());
        let waiter = {
            let cpu = cpu.clone();
            thread::spawn(move || cpu.wait_for_interrupt(&Core::new(2)))
        };
        thread::sleep(Duration::from_millis(20));
        cpu.interrupt(2, InterruptFlags::GENERIC);
        assert_eq!(waiter.join().unwrap(), InterruptFlags::GENERIC);
    }

    #[test]
    fn halt_releases_every_wait() {
        let cpu = HostCpu::new();
        cpu.halt();
        assert!(cpu.wait_for_interrupt(&Core::new(0)).is_empty());
        let mut core = Core::new(1);
        cpu.switch_context(&mut core, Some(Context::new(0x0200_1000, 0)));
        assert_eq!(core.nia, 0x0200_1000);
        assert_eq!(cpu.switches().len(), 1);
    }

    #[test]
    fn start_runs_entrypoint_on_every_core() {
        let cpu = HostCpu::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        cpu.set_core_entrypoint_handler(Arc::new(move |core: &mut Core| {
            sink.lock().unwrap().push(core.id);
        }));
        cpu.start().unwrap();
        cpu.join();
        let mut ids = seen.lock().unwrap().clone();
        ids.sort();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(matches!(cpu.start(), Err(CpuError::AlreadyStarted)));
    }
}
