// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! CPU execution abstraction consumed by the kernel.
//!
//! The instruction engine lives elsewhere; the kernel only needs to install
//! handlers, start and halt the cores, park a core until an interrupt and
//! signal interrupts across cores. [`HostCpu`] provides those pieces on top
//! of host threads.

use std::sync::Arc;

use bitflags::bitflags;
use thiserror::Error;

pub mod host;

pub use host::{ContextSwitch, HostCpu};

/// Index of a physical core.
pub type CoreId = usize;

/// Number of physical cores on the emulated console.
pub const CORE_COUNT: usize = 3;

/// Value idle cores expose in `nia`/`cia`.
pub const IDLE_INSTRUCTION_ADDRESS: u32 = 0xFFFF_FFFF;

bitflags! {
    /// Interrupt kinds deliverable to a core.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InterruptFlags: u32 {
        const SRESET = 1 << 0;
        const GENERIC = 1 << 1;
        const ALARM = 1 << 2;
        const DBGBREAK = 1 << 3;
        const GPU7 = 1 << 4;
        const IPC = 1 << 5;
    }
}

/// Saved guest execution context a sub core can be switched into.
///
/// Opaque to the kernel apart from the instruction address, which is copied
/// into the core on switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub nia: u32,
    pub stack_pointer: u32,
}

impl Context {
    pub const fn new(nia: u32, stack_pointer: u32) -> Self {
        Self { nia, stack_pointer }
    }
}

/// Per-core register state visible to the kernel.
#[derive(Debug)]
pub struct Core {
    pub id: CoreId,
    /// Next instruction address.
    pub nia: u32,
    /// Current instruction address.
    pub cia: u32,
    kernel_context: bool,
}

impl Core {
    pub fn new(id: CoreId) -> Self {
        Self {
            id,
            nia: 0,
            cia: 0,
            kernel_context: false,
        }
    }

    /// Reset the core into a fresh kernel execution and exception context.
    pub fn initialise_kernel_context(&mut self) {
        self.nia = 0;
        self.cia = 0;
        self.kernel_context = true;
    }

    pub fn has_kernel_context(&self) -> bool {
        self.kernel_context
    }
}

pub type EntrypointHandler = Arc<dyn Fn(&mut Core) + Send + Sync>;
pub type BranchTraceHandler = Arc<dyn Fn(&Core, u32) + Send + Sync>;
/// Returns the core execution should continue on, if the call was redirected.
pub type UnknownSystemCallHandler = Arc<dyn Fn(&Core, u32) -> Option<CoreId> + Send + Sync>;

#[derive(Debug, Error)]
pub enum CpuError {
    #[error("cpu already started")]
    AlreadyStarted,
    #[error("no core entrypoint handler installed")]
    NoEntrypoint,
    #[error("failed to spawn thread for core {core}: {source}")]
    Spawn {
        core: CoreId,
        #[source]
        source: std::io::Error,
    },
}

/// The execution engine as seen from the kernel.
pub trait Cpu: Send + Sync {
    fn set_core_entrypoint_handler(&self, handler: EntrypointHandler);
    fn set_branch_trace_handler(&self, handler: BranchTraceHandler);
    fn set_unknown_system_call_handler(&self, handler: UnknownSystemCallHandler);

    /// Begin invoking the entrypoint handler once per core, concurrently.
    fn start(&self) -> Result<(), CpuError>;
    /// Stop every core. Waits return immediately afterwards.
    fn halt(&self);
    /// Block until every core thread has returned.
    fn join(&self);
    fn is_halted(&self) -> bool;

    /// Park `core` until an interrupt is delivered to it or the cpu halts.
    fn wait_for_interrupt(&self, core: &Core) -> InterruptFlags;
    /// Deliver `flags` to `core_id`, waking it if parked.
    fn interrupt(&self, core_id: CoreId, flags: InterruptFlags);

    /// Transfer `core` into `context`. `None` switches to no context at all,
    /// which parks the core for good. Returns only once the core has
    /// finished with guest execution, after which it must not resume.
    fn switch_context(&self, core: &mut Core, context: Option<Context>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_flags_match_hardware_bits() {
        assert_eq!(InterruptFlags::SRESET.bits(), 0x1);
        assert_eq!(InterruptFlags::GENERIC.bits(), 0x2);
        assert_eq!(InterruptFlags::IPC.bits(), 0x20);
    }

    #[test]
    fn kernel_context_resets_instruction_addresses() {
        let mut core = Core::new(2);
        core.nia = 0x0200_0000;
        core.cia = 0x0200_0000;
        core.initialise_kernel_context();
        assert_eq!((core.nia, core.cia), (0, 0));
        assert!(core.has_kernel_context());
    }
}
