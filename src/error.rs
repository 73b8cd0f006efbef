// CLASSIFICATION: COMMUNITY
// Filename: error.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Crate-level error type for kernel bring-up and the public kernel surface.

use thiserror::Error;

use crate::config::ConfigError;
use crate::cpu::{CoreId, CpuError};
use crate::kernel::mmu::MmuError;

/// Errors returned by [`crate::kernel::Kernel`] operations.
///
/// Everything surfaced from [`crate::kernel::Kernel::start`] is fatal: the
/// boot is aborted before any core thread runs.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("kernel already started")]
    AlreadyStarted,
    #[error("static data heap exhausted: requested {requested:#x} bytes, {available:#x} available")]
    StaticHeapExhausted { requested: u32, available: u32 },
    #[error("invalid core id {0}")]
    InvalidCore(CoreId),
    #[error("core {0} is the main core and never takes an entry context")]
    MainCoreHandoff(CoreId),
    #[error(transparent)]
    Mmu(#[from] MmuError),
    #[error(transparent)]
    Cpu(#[from] CpuError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type KernelResult<T> = Result<T, KernelError>;
