// CLASSIFICATION: COMMUNITY
// Filename: process.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Process identity of each core.

use std::sync::Mutex;

use log::debug;

use crate::cpu::{CoreId, CORE_COUNT};
use crate::sync::lock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RamPartitionId {
    Kernel,
    Root,
    Loader,
    OverlayMenu,
    MainApplication,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum UniqueProcessId {
    Kernel = 0,
    Root = 1,
    HomeMenu = 2,
    OverlayMenu = 5,
    Game = 15,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelProcessId {
    Invalid,
    Kernel,
}

/// The logical OS process a core executes as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessIdentity {
    pub ram_partition: RamPartitionId,
    pub upid: UniqueProcessId,
    pub kernel_pid: KernelProcessId,
}

impl ProcessIdentity {
    pub const KERNEL: Self = Self {
        ram_partition: RamPartitionId::Kernel,
        upid: UniqueProcessId::Kernel,
        kernel_pid: KernelProcessId::Invalid,
    };

    pub const GAME: Self = Self {
        ram_partition: RamPartitionId::MainApplication,
        upid: UniqueProcessId::Game,
        kernel_pid: KernelProcessId::Kernel,
    };
}

/// Current process of every core. `None` until the main core tags it.
pub struct CoreProcessTable {
    cores: Mutex<[Option<ProcessIdentity>; CORE_COUNT]>,
}

impl CoreProcessTable {
    pub fn new() -> Self {
        Self {
            cores: Mutex::new([None; CORE_COUNT]),
        }
    }

    pub fn get(&self, core_id: CoreId) -> Option<ProcessIdentity> {
        lock(&self.cores).get(core_id).copied().flatten()
    }

    pub fn set(&self, core_id: CoreId, identity: ProcessIdentity) {
        if let Some(slot) = lock(&self.cores).get_mut(core_id) {
            debug!("core {core_id} now runs as {identity:?}");
            *slot = Some(identity);
        }
    }

    /// Tag every core, not only the caller's, as the kernel process.
    pub fn tag_all_kernel(&self) {
        let mut cores = lock(&self.cores);
        for slot in cores.iter_mut() {
            *slot = Some(ProcessIdentity::KERNEL);
        }
    }
}

impl Default for CoreProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagging_covers_every_core() {
        let table = CoreProcessTable::new();
        assert_eq!(table.get(0), None);
        table.tag_all_kernel();
        for id in 0..CORE_COUNT {
            assert_eq!(table.get(id), Some(ProcessIdentity::KERNEL));
        }
        table.set(2, ProcessIdentity::GAME);
        assert_eq!(table.get(2), Some(ProcessIdentity::GAME));
        assert_eq!(table.get(0), Some(ProcessIdentity::KERNEL));
        assert_eq!(table.get(CORE_COUNT), None);
    }
}
