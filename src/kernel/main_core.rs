// CLASSIFICATION: COMMUNITY
// Filename: main_core.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Bootstrap of the main core: process tagging, IPC, title preparation and
//! the guest load.
//!
//! Failures past this point never crash the core; they are logged and the
//! core falls through to idle, leaving the system running but empty.

use log::{debug, error, info};

use super::mmu;
use super::state::{CoreRole, KernelState};
use super::title::{TitleInfo, DEFAULT_TITLE_ID};
use crate::cpu::{Core, CoreId};
use crate::services::{GameInfo, IpcError};

pub(crate) fn run(state: &KernelState, core: &mut Core) {
    state.set_role(core.id, CoreRole::Main);
    let Some(space) = state.address_space() else {
        error!("core {} started without a kernel address space", core.id);
        return;
    };
    mmu::set_active_address_space(space);
    core.initialise_kernel_context();
    state.initialise_exception_handlers();

    // Must cover every core before any sub core takes a guest context.
    state.processes.tag_all_kernel();
    state.publish_kernel_processes();

    if let Err(e) = bring_up_ipc(state, core.id) {
        error!("IPC bring-up failed on core {}: {e}", core.id);
        return;
    }

    // TODO: the root process loads these once it is emulated.
    if let Err(e) = state.services.loader.load_shared() {
        error!("Failed to load shared libraries: {e}");
        return;
    }

    let info = prepare_title(state);
    if let Some(data) = state.kernel_data() {
        data.set_prepared_title(info.clone());
    }

    if info.argstr.is_empty() {
        error!("Could not find game executable to load.");
        return;
    }

    if let Err(e) = state.services.loader.load_game_process(&info.argstr, &info) {
        error!("Failed to load game process \"{}\": {e}", info.argstr);
        return;
    }

    state.services.events.game_loaded(&GameInfo {
        title_id: info.title_id,
        executable: info.executable().to_string(),
    });

    state.services.loader.finish_init_and_preload(core);
}

fn bring_up_ipc(state: &KernelState, core_id: CoreId) -> Result<(), IpcError> {
    state.services.ipc.init(core_id)?;
    state.services.ipc.open(core_id)?;
    state.services.ipc.initialise_ipc()
}

/// Ask MCP for the default title, or fall back to launching the configured
/// executable directly.
fn prepare_title(state: &KernelState) -> TitleInfo {
    match state.services.process_manager.prepare_title(DEFAULT_TITLE_ID) {
        Ok(mut info) => {
            let argstr = std::mem::take(&mut info.argstr);
            info.set_argstr(&argstr);
            info!(
                "Loaded title {:016X}, argstr \"{}\"",
                info.title_id, info.argstr
            );
            info
        }
        Err(e) => {
            debug!("no prepared title ({e}), using executable filename");
            TitleInfo::fallback(&state.executable_name())
        }
    }
}
