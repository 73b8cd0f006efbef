// CLASSIFICATION: COMMUNITY
// Filename: loader.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

use thiserror::Error;

use crate::cpu::Core;
use crate::kernel::title::TitleInfo;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("failed to read {0}")]
    ReadError(String),
    #[error("invalid executable {0}")]
    Invalid(String),
    #[error("failed to load shared module {0}")]
    SharedModule(String),
}

/// Handle of a loaded guest process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessHandle(pub u32);

/// Guest binary loader and the start of guest scheduling.
pub trait Loader: Send + Sync {
    /// Load the system libraries every process links against.
    fn load_shared(&self) -> Result<(), LoaderError>;

    /// Load `rpx` (the full argument string) as the game process.
    fn load_game_process(&self, rpx: &str, info: &TitleInfo) -> Result<ProcessHandle, LoaderError>;

    /// Finish process initialisation and start running the guest on `core`.
    fn finish_init_and_preload(&self, core: &mut Core);
}
