// CLASSIFICATION: COMMUNITY
// Filename: dispatch.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

use super::state::KernelState;
use super::sub_core::Handoff;
use super::{idle, main_core, sub_core};
use crate::cpu::Core;

/// Entry of every core thread started by the cpu.
pub(crate) fn core_entrypoint(state: &KernelState, core: &mut Core) {
    if core.id == state.main_core {
        main_core::run(state, core);
    } else if let Handoff::Guest(context) = sub_core::run(state, core) {
        // One way: the core belongs to the guest from here on.
        state.cpu().switch_context(core, Some(context));
        return;
    }

    idle::run(state, core);
}
