// CLASSIFICATION: COMMUNITY
// Filename: heap.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Bump heap for kernel static data, carved from the start of the kernel
//! data area. Allocations live for the whole process and are never freed.

use std::sync::Mutex;

use log::debug;

use super::mmu::{self, AddressSpace, PhysRange};
use crate::error::{KernelError, KernelResult};
use crate::sync::lock;

#[derive(Debug)]
pub struct StaticDataHeap {
    region: PhysRange,
    used: Mutex<u32>,
}

impl StaticDataHeap {
    /// Reserve `size` bytes of `space`'s data area for static data.
    pub fn new(space: &AddressSpace, size: u32) -> KernelResult<Self> {
        mmu::ensure_kernel_active()?;
        if size > space.data.size {
            return Err(KernelError::StaticHeapExhausted {
                requested: size,
                available: space.data.size,
            });
        }
        Ok(Self {
            region: PhysRange::new(space.data.start, size),
            used: Mutex::new(0),
        })
    }

    /// Allocate `size` bytes aligned to `align`, returning the address.
    pub fn alloc(&self, size: u32, align: u32) -> KernelResult<u32> {
        mmu::ensure_kernel_active()?;
        let align = align.max(1);
        let mut used = lock(&self.used);
        let offset = used.next_multiple_of(align);
        let available = self.region.size.saturating_sub(offset);
        if size > available {
            return Err(KernelError::StaticHeapExhausted {
                requested: size,
                available,
            });
        }
        *used = offset + size;
        let address = self.region.start + offset;
        debug!("static data {size:#x} bytes at {address:#010x}");
        Ok(address)
    }

    pub fn remaining(&self) -> u32 {
        self.region.size.saturating_sub(*lock(&self.used))
    }

    pub fn region(&self) -> PhysRange {
        self.region
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn activate() -> AddressSpace {
        let space = Arc::new(AddressSpace::kernel().unwrap());
        mmu::set_active_address_space(&space);
        (*space).clone()
    }

    #[test]
    fn allocations_are_aligned_and_bounded() {
        let space = activate();
        let heap = StaticDataHeap::new(&space, 0x100).unwrap();
        assert_eq!(heap.region(), PhysRange::new(0x2000_0000, 0x100));
        assert_eq!(heap.alloc(3, 1).unwrap(), 0x2000_0000);
        assert_eq!(heap.alloc(0x10, 0x10).unwrap(), 0x2000_0010);
        assert_eq!(heap.remaining(), 0xE0);
        assert!(matches!(
            heap.alloc(0x100, 4),
            Err(KernelError::StaticHeapExhausted {
                requested: 0x100,
                available: 0xE0
            })
        ));
    }

    #[test]
    fn requires_active_kernel_space() {
        let space = AddressSpace::kernel().unwrap();
        let result = std::thread::spawn(move || StaticDataHeap::new(&space, 0x100).map(|_| ()))
            .join()
            .unwrap();
        assert!(matches!(result, Err(KernelError::Mmu(mmu::MmuError::Inactive))));
    }
}
