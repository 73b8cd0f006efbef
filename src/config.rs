// CLASSIFICATION: COMMUNITY
// Filename: config.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Emulator settings and the live configuration store.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cpu::{CoreId, CORE_COUNT};
use crate::kernel::static_data::StaticKernelData;
use crate::sync::lock;

/// Environment variable naming the active settings file.
pub const CONFIG_ENV: &str = "ESPRESSO_CONFIG";

/// Smallest static data heap the kernel static data fits in.
pub const MIN_STATIC_DATA_HEAP_SIZE: u32 = StaticKernelData::GUEST_SIZE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("main core {0} is out of range")]
    MainCoreOutOfRange(CoreId),
    #[error("static data heap size {0:#x} is too small")]
    HeapTooSmall(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub branch_trace: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            branch_trace: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelSettings {
    pub main_core: CoreId,
    pub static_data_heap_size: u32,
}

impl Default for KernelSettings {
    fn default() -> Self {
        Self {
            main_core: 1,
            static_data_heap_size: 0x10000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log: LogSettings,
    pub kernel: KernelSettings,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        let settings: Settings = toml::from_str(&data).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Settings from the file named by `ESPRESSO_CONFIG`, or defaults.
    pub fn load_active() -> Self {
        let Ok(path) = std::env::var(CONFIG_ENV) else {
            return Settings::default();
        };
        match Settings::load(Path::new(&path)) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("using default settings: {e}");
                Settings::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kernel.main_core >= CORE_COUNT {
            return Err(ConfigError::MainCoreOutOfRange(self.kernel.main_core));
        }
        if self.kernel.static_data_heap_size < MIN_STATIC_DATA_HEAP_SIZE {
            return Err(ConfigError::HeapTooSmall(self.kernel.static_data_heap_size));
        }
        Ok(())
    }
}

pub type ConfigListener = Arc<dyn Fn(&Settings) + Send + Sync>;

/// Live settings plus the listeners notified when they change.
pub struct ConfigStorage {
    settings: Mutex<Settings>,
    listeners: Mutex<Vec<ConfigListener>>,
}

impl ConfigStorage {
    pub fn new(settings: Settings) -> Arc<Self> {
        Arc::new(Self {
            settings: Mutex::new(settings),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn get(&self) -> Settings {
        lock(&self.settings).clone()
    }

    /// Replace the settings and notify every listener with the new value.
    pub fn set(&self, settings: Settings) {
        *lock(&self.settings) = settings.clone();
        // Listeners run without the lock so they may register others.
        let listeners = lock(&self.listeners).clone();
        for listener in listeners {
            listener(&settings);
        }
    }

    pub fn register_listener(&self, listener: ConfigListener) {
        lock(&self.listeners).push(listener);
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }
}
