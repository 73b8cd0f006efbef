// CLASSIFICATION: COMMUNITY
// Filename: host.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Offline collaborators for booting the kernel on its own, without an
//! emulated IOS, HLE layer or instruction engine.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};

use crate::config::ConfigError;
use crate::cpu::{Core, CoreId, HostCpu};
use crate::kernel::title::{executable_from_argstr, TitleId, TitleInfo};
use crate::services::{
    AppCommand, EventBus, GameInfo, GameListener, HleLibraries, IpcDriver, IpcError, KernelServices,
    Loader, LoaderError, ProcessHandle, ProcessManager, SymbolResolver,
};

pub struct NullIpcDriver;

impl IpcDriver for NullIpcDriver {
    fn init(&self, _core_id: CoreId) -> Result<(), IpcError> {
        Ok(())
    }

    fn open(&self, _core_id: CoreId) -> Result<(), IpcError> {
        Ok(())
    }

    fn initialise_ipc(&self) -> Result<(), IpcError> {
        Ok(())
    }
}

/// Serves one title read from a TOML file, or none at all.
#[derive(Default)]
pub struct OfflineProcessManager {
    title: Option<TitleInfo>,
}

impl OfflineProcessManager {
    pub fn new(title: Option<TitleInfo>) -> Self {
        Self { title }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        let title = toml::from_str(&data).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        Ok(Self::new(Some(title)))
    }
}

impl ProcessManager for OfflineProcessManager {
    fn prepare_title(&self, title_id: TitleId) -> Result<TitleInfo, IpcError> {
        self.title.clone().ok_or(IpcError::TitleNotFound(title_id))
    }

    fn app_control(&self, command: AppCommand) -> Result<(), IpcError> {
        info!("app control {command:?}");
        Ok(())
    }
}

/// Resolves executables against a content directory. Cannot run them.
pub struct HostLoader {
    content_dir: PathBuf,
    next_handle: AtomicU32,
}

impl HostLoader {
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
            next_handle: AtomicU32::new(1),
        }
    }
}

impl Loader for HostLoader {
    fn load_shared(&self) -> Result<(), LoaderError> {
        debug!("shared libraries are provided by HLE");
        Ok(())
    }

    fn load_game_process(&self, rpx: &str, _info: &TitleInfo) -> Result<ProcessHandle, LoaderError> {
        let path = self.content_dir.join(executable_from_argstr(rpx));
        if !path.is_file() {
            return Err(LoaderError::ReadError(path.display().to_string()));
        }
        let handle = ProcessHandle(self.next_handle.fetch_add(1, Ordering::AcqRel));
        info!("loaded {} as process {}", path.display(), handle.0);
        Ok(handle)
    }

    fn finish_init_and_preload(&self, core: &mut Core) {
        warn!(
            "no instruction engine attached, core {} will idle",
            core.id
        );
    }
}

pub struct NullHle;

impl HleLibraries for NullHle {
    fn initialise_libraries(&self) {}

    fn handle_unknown_system_call(&self, core: &Core, id: u32) -> Option<CoreId> {
        warn!("unhandled system call {id:#x} on core {}", core.id);
        None
    }
}

pub struct NullSymbols;

impl SymbolResolver for NullSymbols {
    fn find_closest_symbol(
        &self,
        _address: u32,
        _distance: &mut u32,
        _symbol_name: &mut [u8],
        _module_name: &mut [u8],
    ) -> bool {
        false
    }
}

pub struct LogGameListener;

impl GameListener for LogGameListener {
    fn on_game_loaded(&self, info: &GameInfo) {
        info!("game loaded: {:016X} {}", info.title_id, info.executable);
    }
}

/// Services for a host-only boot over `cpu`.
pub fn offline_services(
    cpu: Arc<HostCpu>,
    process_manager: OfflineProcessManager,
    loader: HostLoader,
) -> KernelServices {
    let events = EventBus::new();
    events.add_listener(Arc::new(LogGameListener));
    KernelServices {
        cpu,
        ipc: Arc::new(NullIpcDriver),
        process_manager: Arc::new(process_manager),
        loader: Arc::new(loader),
        hle: Arc::new(NullHle),
        symbols: Arc::new(NullSymbols),
        events,
    }
}
