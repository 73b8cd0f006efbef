// CLASSIFICATION: COMMUNITY
// Filename: sub_core.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Wait loop of the cores that are not the main core.

use log::{debug, warn};

use super::mmu;
use super::process::ProcessIdentity;
use super::state::{CoreRole, KernelState};
use crate::cpu::{Context, Core};

/// How a sub core left its wait loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Handoff {
    /// Switch into this guest context and never come back.
    Guest(Context),
    Stopped,
}

pub(crate) fn run(state: &KernelState, core: &mut Core) -> Handoff {
    state.set_role(core.id, CoreRole::Polling);
    if let Some(space) = state.address_space() {
        mmu::set_active_address_space(space);
    }
    core.initialise_kernel_context();
    if let Err(e) = state
        .services
        .ipc
        .init(core.id)
        .and_then(|()| state.services.ipc.open(core.id))
    {
        warn!("core {} could not open its IPC driver: {e}", core.id);
    }

    while state.keep_waiting() {
        // Contexts wait in the mailbox until every core is tagged as kernel.
        if state.kernel_processes_ready() {
            if let Some(context) = state.mailbox.take(core.id) {
                state.processes.set(core.id, ProcessIdentity::GAME);
                state.set_role(core.id, CoreRole::Guest);
                debug!("core {} entering guest at {:#010x}", core.id, context.nia);
                return Handoff::Guest(context);
            }
        }
        state.cpu().wait_for_interrupt(core);
    }
    Handoff::Stopped
}
