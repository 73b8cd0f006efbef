// CLASSIFICATION: COMMUNITY
// Filename: ipc.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! IPC transport and the process-management (MCP) service reached over it.

use thiserror::Error;

use crate::cpu::CoreId;
use crate::kernel::title::{TitleId, TitleInfo};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IpcError {
    #[error("ipc driver for core {0} is not open")]
    NotOpen(CoreId),
    #[error("title {0:016X} not found")]
    TitleNotFound(TitleId),
    #[error("ipc request failed with status {0}")]
    Status(i32),
}

/// Commands accepted by the PPC application control ioctl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    PowerOff,
}

/// Per-core IPC kernel driver.
pub trait IpcDriver: Send + Sync {
    fn init(&self, core_id: CoreId) -> Result<(), IpcError>;
    fn open(&self, core_id: CoreId) -> Result<(), IpcError>;
    /// Bring up kernel IPC once the main core's driver is open.
    fn initialise_ipc(&self) -> Result<(), IpcError>;
}

pub trait ProcessManager: Send + Sync {
    /// Resolve launch metadata for `title_id`.
    fn prepare_title(&self, title_id: TitleId) -> Result<TitleInfo, IpcError>;
    fn app_control(&self, command: AppCommand) -> Result<(), IpcError>;
}
