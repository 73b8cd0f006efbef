// CLASSIFICATION: COMMUNITY
// Filename: static_data.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Kernel static data: per-core symbol scratch and the prepared title.

use std::sync::Mutex;

use super::heap::StaticDataHeap;
use super::title::TitleInfo;
use crate::cpu::{CoreId, CORE_COUNT};
use crate::error::KernelResult;
use crate::sync::{lock, with_lock};

pub const SYMBOL_NAME_CAPACITY: usize = 256;
pub const MODULE_NAME_CAPACITY: usize = 256;

/// Guest-side size of the prepared title info structure.
const PREPARE_TITLE_INFO_SIZE: u32 = 0x12D8;
const CORE_SCRATCH_SIZE: u32 = 4 + SYMBOL_NAME_CAPACITY as u32 + MODULE_NAME_CAPACITY as u32;

/// Buffers the branch trace handler resolves symbols into.
#[derive(Clone, Copy)]
pub struct CoreScratch {
    pub symbol_distance: u32,
    pub symbol_name: [u8; SYMBOL_NAME_CAPACITY],
    pub module_name: [u8; MODULE_NAME_CAPACITY],
}

impl CoreScratch {
    fn new() -> Self {
        Self {
            symbol_distance: 0,
            symbol_name: [0; SYMBOL_NAME_CAPACITY],
            module_name: [0; MODULE_NAME_CAPACITY],
        }
    }

    pub fn clear(&mut self) {
        self.symbol_distance = 0;
        self.symbol_name[0] = 0;
        self.module_name[0] = 0;
    }
}

pub struct StaticKernelData {
    address: u32,
    // Each core only touches its own entry, so these locks are uncontended.
    cores: [Mutex<CoreScratch>; CORE_COUNT],
    prepare_title_info: Mutex<TitleInfo>,
}

impl StaticKernelData {
    pub const GUEST_SIZE: u32 = CORE_SCRATCH_SIZE * CORE_COUNT as u32 + PREPARE_TITLE_INFO_SIZE;

    pub fn allocate(heap: &StaticDataHeap) -> KernelResult<Self> {
        let address = heap.alloc(Self::GUEST_SIZE, 4)?;
        Ok(Self {
            address,
            cores: std::array::from_fn(|_| Mutex::new(CoreScratch::new())),
            prepare_title_info: Mutex::new(TitleInfo::default()),
        })
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    /// Run `f` on `core_id`'s scratch buffers. `None` for an unknown core.
    pub fn with_core_scratch<R>(
        &self,
        core_id: CoreId,
        f: impl FnOnce(&mut CoreScratch) -> R,
    ) -> Option<R> {
        self.cores.get(core_id).map(|scratch| with_lock(scratch, f))
    }

    pub fn prepared_title(&self) -> TitleInfo {
        lock(&self.prepare_title_info).clone()
    }

    pub fn set_prepared_title(&self, info: TitleInfo) {
        *lock(&self.prepare_title_info) = info;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KernelError;
    use crate::kernel::mmu::{self, AddressSpace};
    use std::sync::Arc;

    fn heap(size: u32) -> StaticDataHeap {
        let space = Arc::new(AddressSpace::kernel().unwrap());
        mmu::set_active_address_space(&space);
        StaticDataHeap::new(&space, size).unwrap()
    }

    #[test]
    fn allocation_reserves_guest_size() {
        let heap = heap(0x10000);
        let data = StaticKernelData::allocate(&heap).unwrap();
        assert_eq!(data.address(), 0x2000_0000);
        assert_eq!(heap.remaining(), 0x10000 - StaticKernelData::GUEST_SIZE);
    }

    #[test]
    fn exhausted_heap_is_fatal() {
        let heap = heap(0x1000);
        assert!(matches!(
            StaticKernelData::allocate(&heap),
            Err(KernelError::StaticHeapExhausted { .. })
        ));
    }

    #[test]
    fn scratch_is_per_core() {
        let heap = heap(0x10000);
        let data = StaticKernelData::allocate(&heap).unwrap();
        data.with_core_scratch(1, |scratch| scratch.symbol_distance = 8);
        assert_eq!(data.with_core_scratch(1, |s| s.symbol_distance), Some(8));
        assert_eq!(data.with_core_scratch(0, |s| s.symbol_distance), Some(0));
        assert_eq!(data.with_core_scratch(CORE_COUNT, |_| ()), None);
    }
}
