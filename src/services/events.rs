// CLASSIFICATION: COMMUNITY
// Filename: events.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Front-end notifications.

use std::sync::{Arc, Mutex};

use log::debug;

use crate::kernel::title::TitleId;
use crate::sync::lock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInfo {
    pub title_id: TitleId,
    /// Executable path, without launch arguments.
    pub executable: String,
}

pub trait GameListener: Send + Sync {
    fn on_game_loaded(&self, info: &GameInfo);
}

/// Fan-out of kernel events to registered listeners.
#[derive(Default)]
pub struct EventBus {
    listeners: Mutex<Vec<Arc<dyn GameListener>>>,
}

impl EventBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_listener(&self, listener: Arc<dyn GameListener>) {
        lock(&self.listeners).push(listener);
    }

    pub fn game_loaded(&self, info: &GameInfo) {
        debug!(
            "game loaded: {:016X} {}",
            info.title_id, info.executable
        );
        // Listeners run without the lock so they may register others.
        let listeners = lock(&self.listeners).clone();
        for listener in listeners {
            listener.on_game_loaded(info);
        }
    }
}
