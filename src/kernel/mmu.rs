// CLASSIFICATION: COMMUNITY
// Filename: mmu.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Virtual address space layouts and their per-core activation.
//!
//! Each core runs on its own host thread, so the active address space is
//! tracked per thread. Kernel memory operations check it first.

use std::cell::RefCell;
use std::sync::Arc;

use thiserror::Error;

use super::process::RamPartitionId;

/// Physical code area of the kernel address space.
pub const KERNEL_CODE: PhysRange = PhysRange::new(0x7200_0000, 0x0E00_0000);
/// Physical data area of the kernel address space.
pub const KERNEL_DATA: PhysRange = PhysRange::new(0x2000_0000, 0x5200_0000);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MmuError {
    #[error("{name} range {start:#010x}+{size:#x} wraps the physical address space")]
    Wraps {
        name: &'static str,
        start: u32,
        size: u32,
    },
    #[error("{first} range overlaps {second} range")]
    Overlap {
        first: &'static str,
        second: &'static str,
    },
    #[error("kernel address space is not active on this core")]
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhysRange {
    pub start: u32,
    pub size: u32,
}

impl PhysRange {
    pub const EMPTY: Self = Self::new(0, 0);

    pub const fn new(start: u32, size: u32) -> Self {
        Self { start, size }
    }

    pub fn end(&self) -> u64 {
        u64::from(self.start) + u64::from(self.size)
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn overlaps(&self, other: &PhysRange) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && u64::from(self.start) < other.end()
            && u64::from(other.start) < self.end()
    }
}

/// Memory layout of one process role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSpace {
    pub partition: RamPartitionId,
    pub code: PhysRange,
    pub data: PhysRange,
    pub reserved: PhysRange,
    pub available: PhysRange,
    pub codegen: PhysRange,
    pub codegen_core: u32,
    pub overlay_arena: bool,
}

impl AddressSpace {
    /// The kernel layout. Its boundaries are fixed by guest expectations.
    pub fn kernel() -> Result<Self, MmuError> {
        AddressSpace {
            partition: RamPartitionId::Kernel,
            code: KERNEL_CODE,
            data: KERNEL_DATA,
            reserved: PhysRange::EMPTY,
            available: PhysRange::EMPTY,
            codegen: PhysRange::EMPTY,
            codegen_core: 0,
            overlay_arena: false,
        }
        .validated()
    }

    pub fn validated(self) -> Result<Self, MmuError> {
        let ranges = [
            ("code", self.code),
            ("data", self.data),
            ("reserved", self.reserved),
            ("available", self.available),
            ("codegen", self.codegen),
        ];
        for (name, range) in ranges {
            if range.end() > 1u64 << 32 {
                return Err(MmuError::Wraps {
                    name,
                    start: range.start,
                    size: range.size,
                });
            }
        }
        for (i, (first, a)) in ranges.iter().enumerate() {
            for (second, b) in &ranges[i + 1..] {
                if a.overlaps(b) {
                    return Err(MmuError::Overlap {
                        first: *first,
                        second: *second,
                    });
                }
            }
        }
        Ok(self)
    }
}

thread_local! {
    static ACTIVE: RefCell<Option<Arc<AddressSpace>>> = const { RefCell::new(None) };
}

/// Make `space` the address space of the calling core.
pub fn set_active_address_space(space: &Arc<AddressSpace>) {
    ACTIVE.with(|active| *active.borrow_mut() = Some(space.clone()));
}

pub fn active_address_space() -> Option<Arc<AddressSpace>> {
    ACTIVE.with(|active| active.borrow().clone())
}

/// Fails unless the calling core has the kernel address space active.
pub fn ensure_kernel_active() -> Result<(), MmuError> {
    match active_address_space() {
        Some(space) if space.partition == RamPartitionId::Kernel => Ok(()),
        _ => Err(MmuError::Inactive),
    }
}
