// CLASSIFICATION: COMMUNITY
// Filename: idle.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

use log::info;

use super::state::{CoreRole, KernelState};
use crate::cpu::{Core, IDLE_INSTRUCTION_ADDRESS};

/// Park a core with nothing left to do until the kernel stops.
pub(crate) fn run(state: &KernelState, core: &mut Core) {
    // Reschedule shows idle cores with this nia/cia; keep them in sync.
    core.nia = IDLE_INSTRUCTION_ADDRESS;
    core.cia = IDLE_INSTRUCTION_ADDRESS;
    state.set_role(core.id, CoreRole::Idle);

    while state.keep_waiting() {
        state.cpu().wait_for_interrupt(core);
    }

    state.set_role(core.id, CoreRole::Exited);
    info!("Core {} exit", core.id);
}
