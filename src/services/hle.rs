// CLASSIFICATION: COMMUNITY
// Filename: hle.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

use crate::cpu::{Core, CoreId};

/// High-level emulation of the guest OS libraries.
pub trait HleLibraries: Send + Sync {
    fn initialise_libraries(&self);

    /// Fallback for a system call id the cpu has no handler for. Returns the
    /// core execution continues on when the call was redirected.
    fn handle_unknown_system_call(&self, core: &Core, id: u32) -> Option<CoreId>;
}
