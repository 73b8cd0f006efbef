// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Recording doubles shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use espresso_kernel::config::{ConfigStorage, Settings};
use espresso_kernel::cpu::{
    BranchTraceHandler, Context, ContextSwitch, Core, CoreId, Cpu, CpuError, EntrypointHandler,
    HostCpu, InterruptFlags, UnknownSystemCallHandler,
};
use espresso_kernel::kernel::title::{TitleId, TitleInfo};
use espresso_kernel::services::{
    AppCommand, EventBus, GameInfo, GameListener, HleLibraries, IpcDriver, IpcError, KernelServices,
    Loader, LoaderError, ProcessHandle, ProcessManager, SymbolResolver,
};
use espresso_kernel::Kernel;

/// Host cpu that also counts halt requests.
#[derive(Default)]
pub struct CountingCpu {
    pub inner: HostCpu,
    pub halts: AtomicUsize,
    /// Start the cores, then halt them and report a spawn failure.
    pub fail_start: AtomicBool,
}

impl CountingCpu {
    pub fn switches_for(&self, core: CoreId) -> Vec<Option<Context>> {
        self.inner
            .switches()
            .into_iter()
            .filter(|switch| switch.core == core)
            .map(|switch| switch.context)
            .collect()
    }

    pub fn switches(&self) -> Vec<ContextSwitch> {
        self.inner.switches()
    }
}

impl Cpu for CountingCpu {
    fn set_core_entrypoint_handler(&self, handler: EntrypointHandler) {
        self.inner.set_core_entrypoint_handler(handler)
    }

    fn set_branch_trace_handler(&self, handler: BranchTraceHandler) {
        self.inner.set_branch_trace_handler(handler)
    }

    fn set_unknown_system_call_handler(&self, handler: UnknownSystemCallHandler) {
        self.inner.set_unknown_system_call_handler(handler)
    }

    fn start(&self) -> Result<(), CpuError> {
        self.inner.start()?;
        if self.fail_start.load(Ordering::SeqCst) {
            self.inner.halt();
            return Err(CpuError::Spawn {
                core: 2,
                source: std::io::Error::new(std::io::ErrorKind::Other, "out of threads"),
            });
        }
        Ok(())
    }

    fn halt(&self) {
        self.halts.fetch_add(1, Ordering::SeqCst);
        self.inner.halt()
    }

    fn join(&self) {
        self.inner.join()
    }

    fn is_halted(&self) -> bool {
        self.inner.is_halted()
    }

    fn wait_for_interrupt(&self, core: &Core) -> InterruptFlags {
        self.inner.wait_for_interrupt(core)
    }

    fn interrupt(&self, core_id: CoreId, flags: InterruptFlags) {
        self.inner.interrupt(core_id, flags)
    }

    fn switch_context(&self, core: &mut Core, context: Option<Context>) {
        self.inner.switch_context(core, context)
    }
}

#[derive(Default)]
pub struct RecordingIpc {
    pub calls: Mutex<Vec<String>>,
    pub fail_initialise: AtomicBool,
}

impl IpcDriver for RecordingIpc {
    fn init(&self, core_id: CoreId) -> Result<(), IpcError> {
        self.calls.lock().unwrap().push(format!("init {core_id}"));
        Ok(())
    }

    fn open(&self, core_id: CoreId) -> Result<(), IpcError> {
        self.calls.lock().unwrap().push(format!("open {core_id}"));
        Ok(())
    }

    fn initialise_ipc(&self) -> Result<(), IpcError> {
        self.calls.lock().unwrap().push("initialise".into());
        if self.fail_initialise.load(Ordering::SeqCst) {
            Err(IpcError::Status(-3))
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
pub struct ScriptedProcessManager {
    pub title: Mutex<Option<TitleInfo>>,
    pub requested: Mutex<Vec<TitleId>>,
    pub controls: Mutex<Vec<AppCommand>>,
}

impl ProcessManager for ScriptedProcessManager {
    fn prepare_title(&self, title_id: TitleId) -> Result<TitleInfo, IpcError> {
        self.requested.lock().unwrap().push(title_id);
        self.title
            .lock()
            .unwrap()
            .clone()
            .ok_or(IpcError::TitleNotFound(title_id))
    }

    fn app_control(&self, command: AppCommand) -> Result<(), IpcError> {
        self.controls.lock().unwrap().push(command);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingLoader {
    pub shared: AtomicUsize,
    pub loads: Mutex<Vec<(String, TitleInfo)>>,
    pub preloads: Mutex<Vec<CoreId>>,
}

impl RecordingLoader {
    pub fn loaded_argstrs(&self) -> Vec<String> {
        self.loads
            .lock()
            .unwrap()
            .iter()
            .map(|(rpx, _)| rpx.clone())
            .collect()
    }
}

impl Loader for RecordingLoader {
    fn load_shared(&self) -> Result<(), LoaderError> {
        self.shared.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load_game_process(&self, rpx: &str, info: &TitleInfo) -> Result<ProcessHandle, LoaderError> {
        let mut loads = self.loads.lock().unwrap();
        loads.push((rpx.to_string(), info.clone()));
        Ok(ProcessHandle(loads.len() as u32))
    }

    fn finish_init_and_preload(&self, core: &mut Core) {
        self.preloads.lock().unwrap().push(core.id);
    }
}

#[derive(Default)]
pub struct RecordingHle {
    pub initialised: AtomicUsize,
    pub calls: Mutex<Vec<(CoreId, u32)>>,
    pub redirect: Mutex<Option<CoreId>>,
}

impl HleLibraries for RecordingHle {
    fn initialise_libraries(&self) {
        self.initialised.fetch_add(1, Ordering::SeqCst);
    }

    fn handle_unknown_system_call(&self, core: &Core, id: u32) -> Option<CoreId> {
        self.calls.lock().unwrap().push((core.id, id));
        *self.redirect.lock().unwrap()
    }
}

/// Resolves every address at or above `base` to `module|symbol`.
pub struct FixedSymbols {
    pub base: u32,
    pub module: &'static str,
    pub symbol: &'static str,
    pub lookups: AtomicUsize,
}

impl Default for FixedSymbols {
    fn default() -> Self {
        Self {
            base: 0x0200_0000,
            module: "coreinit.rpl",
            symbol: "OSReport",
            lookups: AtomicUsize::new(0),
        }
    }
}

impl SymbolResolver for FixedSymbols {
    fn find_closest_symbol(
        &self,
        address: u32,
        distance: &mut u32,
        symbol_name: &mut [u8],
        module_name: &mut [u8],
    ) -> bool {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if address < self.base {
            return false;
        }
        *distance = address - self.base;
        symbol_name[..self.symbol.len()].copy_from_slice(self.symbol.as_bytes());
        symbol_name[self.symbol.len()] = 0;
        module_name[..self.module.len()].copy_from_slice(self.module.as_bytes());
        module_name[self.module.len()] = 0;
        true
    }
}

#[derive(Default)]
pub struct RecordingListener {
    pub events: Mutex<Vec<GameInfo>>,
}

impl GameListener for RecordingListener {
    fn on_game_loaded(&self, info: &GameInfo) {
        self.events.lock().unwrap().push(info.clone());
    }
}

pub struct Harness {
    pub kernel: Kernel,
    pub config: Arc<ConfigStorage>,
    pub cpu: Arc<CountingCpu>,
    pub ipc: Arc<RecordingIpc>,
    pub process_manager: Arc<ScriptedProcessManager>,
    pub loader: Arc<RecordingLoader>,
    pub hle: Arc<RecordingHle>,
    pub symbols: Arc<FixedSymbols>,
    pub listener: Arc<RecordingListener>,
}

impl Harness {
    pub fn new(title: Option<TitleInfo>) -> Self {
        Self::with_settings(Settings::default(), title)
    }

    pub fn with_settings(settings: Settings, title: Option<TitleInfo>) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let cpu = Arc::new(CountingCpu::default());
        let ipc = Arc::new(RecordingIpc::default());
        let process_manager = Arc::new(ScriptedProcessManager {
            title: Mutex::new(title),
            ..ScriptedProcessManager::default()
        });
        let loader = Arc::new(RecordingLoader::default());
        let hle = Arc::new(RecordingHle::default());
        let symbols = Arc::new(FixedSymbols::default());
        let listener = Arc::new(RecordingListener::default());
        let events = EventBus::new();
        events.add_listener(listener.clone());

        let services = KernelServices {
            cpu: cpu.clone(),
            ipc: ipc.clone(),
            process_manager: process_manager.clone(),
            loader: loader.clone(),
            hle: hle.clone(),
            symbols: symbols.clone(),
            events,
        };
        let config = ConfigStorage::new(settings);
        let kernel = Kernel::new(services, config.clone()).expect("valid settings");
        Self {
            kernel,
            config,
            cpu,
            ipc,
            process_manager,
            loader,
            hle,
            symbols,
            listener,
        }
    }

    pub fn shutdown(&self) {
        self.kernel.stop();
        self.kernel.join();
    }
}

/// Poll `condition` until it holds or five seconds pass.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

pub fn title(title_id: TitleId, argstr: &str) -> TitleInfo {
    TitleInfo {
        title_id,
        argstr: argstr.into(),
        version: 2,
        codegen_core: 1,
        ..TitleInfo::default()
    }
}
