// CLASSIFICATION: COMMUNITY
// Filename: state.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Shared state of one kernel instance, handed to every core.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};

use log::debug;
use once_cell::sync::OnceCell;

use super::heap::StaticDataHeap;
use super::mailbox::EntryMailbox;
use super::mmu::AddressSpace;
use super::process::CoreProcessTable;
use super::static_data::StaticKernelData;
use crate::config::ConfigStorage;
use crate::cpu::{CoreId, Cpu, InterruptFlags, CORE_COUNT};
use crate::services::KernelServices;
use crate::sync::{lock, with_lock};

/// What a core is doing. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreRole {
    Uninitialised,
    /// Running the main core bootstrap.
    Main,
    /// Sub core waiting for an entry context.
    Polling,
    /// Sub core handed to guest code for good.
    Guest,
    Idle,
    /// Left the idle loop after shutdown.
    Exited,
}

pub(crate) struct KernelState {
    pub(crate) services: KernelServices,
    pub(crate) config: Arc<ConfigStorage>,
    pub(crate) main_core: CoreId,
    pub(crate) static_data_heap_size: u32,
    pub(crate) mailbox: EntryMailbox,
    pub(crate) processes: CoreProcessTable,
    pub(crate) started: AtomicBool,
    pub(crate) config_listener: Once,
    pub(crate) branch_trace_enabled: AtomicBool,
    pub(crate) branch_trace_handler_set: AtomicBool,
    stopping: AtomicBool,
    kernel_processes_ready: AtomicBool,
    exception_handlers: Once,
    address_space: OnceCell<Arc<AddressSpace>>,
    heap: OnceCell<StaticDataHeap>,
    kernel_data: OnceCell<StaticKernelData>,
    roles: Mutex<[CoreRole; CORE_COUNT]>,
    executable_name: Mutex<String>,
}

impl KernelState {
    pub(crate) fn new(services: KernelServices, config: Arc<ConfigStorage>) -> Self {
        let settings = config.get();
        Self {
            services,
            config,
            main_core: settings.kernel.main_core,
            static_data_heap_size: settings.kernel.static_data_heap_size,
            mailbox: EntryMailbox::new(),
            processes: CoreProcessTable::new(),
            started: AtomicBool::new(false),
            config_listener: Once::new(),
            branch_trace_enabled: AtomicBool::new(false),
            branch_trace_handler_set: AtomicBool::new(false),
            stopping: AtomicBool::new(false),
            kernel_processes_ready: AtomicBool::new(false),
            exception_handlers: Once::new(),
            address_space: OnceCell::new(),
            heap: OnceCell::new(),
            kernel_data: OnceCell::new(),
            roles: Mutex::new([CoreRole::Uninitialised; CORE_COUNT]),
            executable_name: Mutex::new(String::new()),
        }
    }

    pub(crate) fn cpu(&self) -> &dyn Cpu {
        self.services.cpu.as_ref()
    }

    pub(crate) fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::Acquire)
    }

    /// Set the stopping flag. Returns `true` only for the call that set it.
    pub(crate) fn begin_stopping(&self) -> bool {
        self.stopping
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn force_stopping(&self) {
        self.stopping.store(true, Ordering::Release);
    }

    /// Whether a parked core should keep waiting. A cpu halted behind the
    /// kernel's back stops the kernel too, since waits no longer block.
    pub(crate) fn keep_waiting(&self) -> bool {
        if self.is_stopping() {
            return false;
        }
        if self.cpu().is_halted() {
            self.force_stopping();
            return false;
        }
        true
    }

    /// Record the static memory set up at boot. Later calls are ignored.
    pub(crate) fn install_memory(
        &self,
        space: Arc<AddressSpace>,
        heap: StaticDataHeap,
        data: StaticKernelData,
    ) {
        let _ = self.address_space.set(space);
        let _ = self.heap.set(heap);
        let _ = self.kernel_data.set(data);
    }

    pub(crate) fn address_space(&self) -> Option<&Arc<AddressSpace>> {
        self.address_space.get()
    }

    pub(crate) fn heap(&self) -> Option<&StaticDataHeap> {
        self.heap.get()
    }

    pub(crate) fn kernel_data(&self) -> Option<&StaticKernelData> {
        self.kernel_data.get()
    }

    /// Install the exception handler tables. Process-wide; runs once however
    /// many cores call it.
    pub(crate) fn initialise_exception_handlers(&self) {
        self.exception_handlers
            .call_once(|| debug!("exception handler tables installed"));
    }

    pub(crate) fn exception_handlers_installed(&self) -> bool {
        self.exception_handlers.is_completed()
    }

    /// Every core is tagged as the kernel process: sub cores may now take
    /// entry contexts. Wakes them so pending contexts are seen.
    pub(crate) fn publish_kernel_processes(&self) {
        self.kernel_processes_ready.store(true, Ordering::Release);
        for id in (0..CORE_COUNT).filter(|id| *id != self.main_core) {
            self.cpu().interrupt(id, InterruptFlags::GENERIC);
        }
    }

    pub(crate) fn kernel_processes_ready(&self) -> bool {
        self.kernel_processes_ready.load(Ordering::Acquire)
    }

    pub(crate) fn role(&self, core_id: CoreId) -> Option<CoreRole> {
        lock(&self.roles).get(core_id).copied()
    }

    pub(crate) fn set_role(&self, core_id: CoreId, role: CoreRole) {
        with_lock(&self.roles, |roles| {
            if let Some(slot) = roles.get_mut(core_id) {
                *slot = role;
            }
        });
    }

    pub(crate) fn executable_name(&self) -> String {
        lock(&self.executable_name).clone()
    }

    pub(crate) fn set_executable_name(&self, name: String) {
        *lock(&self.executable_name) = name;
    }
}
