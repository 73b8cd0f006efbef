// CLASSIFICATION: COMMUNITY
// Filename: boot.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Single-shot kernel bring-up on the control thread.
//!
//! Order matters: the kernel address space must be active before the static
//! data heap exists, and the heap before the kernel static data. Any failure
//! here aborts the boot before a single core starts.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use log::info;

use super::diagnostics;
use super::dispatch;
use super::heap::StaticDataHeap;
use super::mmu::{self, AddressSpace};
use super::state::KernelState;
use super::static_data::StaticKernelData;
use crate::cpu::Core;
use crate::error::{KernelError, KernelResult};

pub(crate) fn start(state: &Arc<KernelState>) -> KernelResult<()> {
    if state.started.swap(true, Ordering::AcqRel) {
        return Err(KernelError::AlreadyStarted);
    }

    register_config_listener(state);
    state.services.hle.initialise_libraries();

    let space = Arc::new(AddressSpace::kernel()?);
    mmu::set_active_address_space(&space);
    let heap = StaticDataHeap::new(&space, state.static_data_heap_size)?;
    let data = StaticKernelData::allocate(&heap)?;
    info!(
        "kernel static data at {:#010x}, {:#x} bytes of static heap left",
        data.address(),
        heap.remaining()
    );
    state.install_memory(space, heap, data);

    install_core_entrypoint(state);
    diagnostics::set_branch_trace(state, state.config.get().log.branch_trace);
    diagnostics::install_unknown_system_call_handler(state);

    if let Err(e) = state.cpu().start() {
        // Cores that did start must not outlive the failed boot.
        state.force_stopping();
        state.cpu().halt();
        return Err(e.into());
    }
    info!("cpu started, main core {}", state.main_core);
    Ok(())
}

fn register_config_listener(state: &Arc<KernelState>) {
    state.config_listener.call_once(|| {
        let weak = Arc::downgrade(state);
        state.config.register_listener(Arc::new(move |settings| {
            if let Some(state) = weak.upgrade() {
                diagnostics::apply_settings(&state, settings);
            }
        }));
    });
}

fn install_core_entrypoint(state: &Arc<KernelState>) {
    let weak = Arc::downgrade(state);
    state
        .cpu()
        .set_core_entrypoint_handler(Arc::new(move |core: &mut Core| {
            if let Some(state) = weak.upgrade() {
                dispatch::core_entrypoint(&state, core);
            }
        }));
}
