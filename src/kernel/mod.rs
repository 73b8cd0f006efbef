// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! The kernel: boot, per-core roles, guest handoff and shutdown.
//!
//! [`Kernel::start`] runs the boot sequence on the calling thread and starts
//! the cpu, which enters every core concurrently. The main core prepares and
//! loads the title; the other cores wait for an entry context handed over
//! with [`Kernel::set_sub_core_entry_context`]. Cores with nothing left to
//! run idle until [`Kernel::stop`].

use std::sync::Arc;

use log::debug;

mod boot;
pub mod diagnostics;
mod dispatch;
pub mod heap;
mod idle;
pub mod mailbox;
mod main_core;
pub mod mmu;
pub mod process;
mod shutdown;
mod state;
pub mod static_data;
mod sub_core;
pub mod title;

pub use process::ProcessIdentity;
pub use state::CoreRole;
pub use title::{TitleInfo, DEFAULT_TITLE_ID};

use crate::config::ConfigStorage;
use crate::cpu::{Context, Core, CoreId, InterruptFlags, CORE_COUNT};
use crate::error::{KernelError, KernelResult};
use crate::services::KernelServices;
use state::KernelState;

/// One emulated kernel instance.
pub struct Kernel {
    state: Arc<KernelState>,
}

impl Kernel {
    /// Create a kernel over `services`. The main core and static heap size
    /// are fixed from `config` here.
    pub fn new(services: KernelServices, config: Arc<ConfigStorage>) -> KernelResult<Self> {
        config.get().validate()?;
        Ok(Self {
            state: Arc::new(KernelState::new(services, config)),
        })
    }

    /// Boot the kernel and start the cpu. Returns once the cores are
    /// running, without waiting for the guest.
    pub fn start(&self) -> KernelResult<()> {
        boot::start(&self.state)
    }

    /// Stop every core. Idempotent.
    pub fn stop(&self) {
        shutdown::stop(&self.state);
    }

    /// Guest-initiated exit, called on the exiting core's thread.
    pub fn exit(&self, core: &mut Core) {
        shutdown::exit(&self.state, core);
    }

    /// Block until every core thread has finished.
    pub fn join(&self) {
        shutdown::join(&self.state);
    }

    pub fn has_exited(&self) -> bool {
        self.state.is_stopping()
    }

    /// Executable launched when no title can be prepared.
    pub fn set_executable_filename(&self, name: impl Into<String>) {
        self.state.set_executable_name(name.into());
    }

    /// Hand `context` to sub core `core_id` and wake it. Replaces any context
    /// the core has not taken yet.
    pub fn set_sub_core_entry_context(&self, core_id: CoreId, context: Context) -> KernelResult<()> {
        if core_id >= CORE_COUNT {
            return Err(KernelError::InvalidCore(core_id));
        }
        if core_id == self.state.main_core {
            return Err(KernelError::MainCoreHandoff(core_id));
        }
        if let Some(previous) = self.state.mailbox.post(core_id, context) {
            debug!("core {core_id}: entry context {previous:?} replaced before use");
        }
        self.state.cpu().interrupt(core_id, InterruptFlags::GENERIC);
        Ok(())
    }

    /// The main core has finished its bootstrap without handing any core to
    /// a guest, so nothing will run until a context is assigned.
    pub fn is_quiescent(&self) -> bool {
        let main_done = matches!(
            self.state.role(self.state.main_core),
            Some(CoreRole::Idle | CoreRole::Exited)
        );
        main_done && (0..CORE_COUNT).all(|id| self.state.role(id) != Some(CoreRole::Guest))
    }

    pub fn main_core(&self) -> CoreId {
        self.state.main_core
    }

    pub fn core_role(&self, core_id: CoreId) -> Option<CoreRole> {
        self.state.role(core_id)
    }

    pub fn core_process(&self, core_id: CoreId) -> Option<ProcessIdentity> {
        self.state.processes.get(core_id)
    }

    pub fn branch_trace_enabled(&self) -> bool {
        self.state
            .branch_trace_enabled
            .load(std::sync::atomic::Ordering::Acquire)
    }

    pub fn exception_handlers_installed(&self) -> bool {
        self.state.exception_handlers_installed()
    }

    /// Title info the main core resolved, once boot has allocated it.
    pub fn prepared_title(&self) -> Option<TitleInfo> {
        self.state.kernel_data().map(|data| data.prepared_title())
    }

    /// Unused bytes of the static data heap, once boot has created it.
    pub fn static_heap_remaining(&self) -> Option<u32> {
        self.state.heap().map(|heap| heap.remaining())
    }
}
