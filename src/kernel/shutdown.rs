// CLASSIFICATION: COMMUNITY
// Filename: shutdown.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Halt and exit. Cores notice the stopping flag at their next wait.

use log::{info, warn};

use super::state::KernelState;
use crate::cpu::Core;
use crate::services::AppCommand;

pub(crate) fn stop(state: &KernelState) {
    if state.begin_stopping() {
        info!("kernel stopping");
        state.cpu().halt();
    }
}

/// Guest-initiated exit from `core`. The core never resumes guest code.
pub(crate) fn exit(state: &KernelState, core: &mut Core) {
    // IOS threads should stop along with the PPC side.
    if let Err(e) = state
        .services
        .process_manager
        .app_control(AppCommand::PowerOff)
    {
        warn!("power off request failed: {e}");
    }

    state.force_stopping();
    state.cpu().halt();
    state.cpu().switch_context(core, None);
}

pub(crate) fn join(state: &KernelState) {
    state.cpu().join();
    info!("all cores joined");
}
