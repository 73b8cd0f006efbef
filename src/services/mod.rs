// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! External collaborators the kernel orchestrates.
//!
//! Each seam is a trait so the kernel can run against the real IOS, loader
//! and HLE layers, the offline stand-ins in [`crate::host`], or test doubles.

use std::sync::Arc;

use crate::cpu::Cpu;

pub mod events;
pub mod hle;
pub mod ipc;
pub mod loader;
pub mod symbols;

pub use events::{EventBus, GameInfo, GameListener};
pub use hle::HleLibraries;
pub use ipc::{AppCommand, IpcDriver, IpcError, ProcessManager};
pub use loader::{Loader, LoaderError, ProcessHandle};
pub use symbols::SymbolResolver;

/// Everything the kernel needs from the rest of the emulator.
#[derive(Clone)]
pub struct KernelServices {
    pub cpu: Arc<dyn Cpu>,
    pub ipc: Arc<dyn IpcDriver>,
    pub process_manager: Arc<dyn ProcessManager>,
    pub loader: Arc<dyn Loader>,
    pub hle: Arc<dyn HleLibraries>,
    pub symbols: Arc<dyn SymbolResolver>,
    pub events: Arc<EventBus>,
}
