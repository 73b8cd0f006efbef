// CLASSIFICATION: COMMUNITY
// Filename: diagnostics.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Inline cpu hooks: branch tracing and the unknown system call fallback.
//!
//! Both run on the calling core's thread in the middle of instruction
//! dispatch and must not block or allocate.

use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use log::trace;

use super::state::KernelState;
use super::static_data::{CoreScratch, StaticKernelData};
use crate::config::Settings;
use crate::cpu::{Core, CoreId};
use crate::services::SymbolResolver;

/// A branch target as it appears in the trace log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchTarget<'a> {
    Symbol {
        target: u32,
        module: &'a str,
        symbol: &'a str,
        distance: u32,
    },
    Address(u32),
}

impl fmt::Display for BranchTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchTarget::Symbol {
                target,
                module,
                symbol,
                distance,
            } => write!(f, "0x{target:08X} {module}|{symbol}+0x{distance:X}"),
            BranchTarget::Address(target) => write!(f, "0x{target:08X}"),
        }
    }
}

impl<'a> BranchTarget<'a> {
    /// Interpret the scratch buffers after a symbol lookup.
    pub fn from_lookup(target: u32, found: bool, scratch: &'a CoreScratch) -> Self {
        let module = nul_terminated(&scratch.module_name);
        let symbol = nul_terminated(&scratch.symbol_name);
        if found && !module.is_empty() && !symbol.is_empty() {
            BranchTarget::Symbol {
                target,
                module,
                symbol,
                distance: scratch.symbol_distance,
            }
        } else {
            BranchTarget::Address(target)
        }
    }
}

fn nul_terminated(buffer: &[u8]) -> &str {
    let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
    std::str::from_utf8(&buffer[..end]).unwrap_or_default()
}

pub(crate) fn branch_trace(state: &KernelState, core: &Core, target: u32) {
    if !state.branch_trace_enabled.load(Ordering::Relaxed) {
        return;
    }
    let Some(data) = state.kernel_data() else {
        trace!("CPU branched to: {}", BranchTarget::Address(target));
        return;
    };
    match resolve_branch(data, state.services.symbols.as_ref(), core.id, target) {
        Some((found, resolved)) => trace!(
            "CPU branched to: {}",
            BranchTarget::from_lookup(target, found, &resolved)
        ),
        None => trace!("CPU branched to: {}", BranchTarget::Address(target)),
    }
}

/// Look `target` up through `core_id`'s scratch buffers and return a copy
/// of them, so the scratch lock is released before anything is logged.
fn resolve_branch(
    data: &StaticKernelData,
    symbols: &dyn SymbolResolver,
    core_id: CoreId,
    target: u32,
) -> Option<(bool, CoreScratch)> {
    data.with_core_scratch(core_id, |scratch| {
        scratch.clear();
        let found = symbols.find_closest_symbol(
            target,
            &mut scratch.symbol_distance,
            &mut scratch.symbol_name,
            &mut scratch.module_name,
        );
        (found, *scratch)
    })
}

pub(crate) fn unknown_system_call(state: &KernelState, core: &Core, id: u32) -> Option<CoreId> {
    state.services.hle.handle_unknown_system_call(core, id)
}

/// Follow the branch trace setting. The handler is installed the first time
/// tracing is enabled and left in place; the flag decides whether it logs.
pub(crate) fn set_branch_trace(state: &Arc<KernelState>, enabled: bool) {
    if enabled && !state.branch_trace_handler_set.swap(true, Ordering::AcqRel) {
        install_branch_trace_handler(state);
    }
    state.branch_trace_enabled.store(enabled, Ordering::Release);
}

pub(crate) fn apply_settings(state: &Arc<KernelState>, settings: &Settings) {
    set_branch_trace(state, settings.log.branch_trace);
}

fn install_branch_trace_handler(state: &Arc<KernelState>) {
    let weak = Arc::downgrade(state);
    state
        .cpu()
        .set_branch_trace_handler(Arc::new(move |core: &Core, target: u32| {
            if let Some(state) = weak.upgrade() {
                branch_trace(&state, core, target);
            }
        }));
}

pub(crate) fn install_unknown_system_call_handler(state: &Arc<KernelState>) {
    let weak = Arc::downgrade(state);
    state
        .cpu()
        .set_unknown_system_call_handler(Arc::new(move |core: &Core, id: u32| {
            weak.upgrade()
                .and_then(|state| unknown_system_call(&state, core, id))
        }));
}
