// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v0.1
// Date Modified: 2026-10-16
// Author: Lukas Bower

//! Kernel bootstrap and multi-core role scheduling for a console OS emulator.

/// CPU execution abstraction and the threaded host cpu
pub mod cpu;

/// Kernel boot, core roles, guest handoff and shutdown
pub mod kernel;

/// External collaborators (IPC, loader, HLE, symbols, events)
pub mod services;

/// Offline collaborators for host-only boots
pub mod host;

pub mod config;
pub mod error;
pub mod logging;

mod sync;

pub use error::{KernelError, KernelResult};
pub use kernel::Kernel;
