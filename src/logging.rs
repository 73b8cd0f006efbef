// CLASSIFICATION: COMMUNITY
// Filename: logging.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

use env_logger::{Builder, Env};

use crate::config::LogSettings;

/// Install the `env_logger` backend. `RUST_LOG` overrides the configured level.
///
/// Branch tracing logs at `trace`, so enabling it raises the default filter.
pub fn init(settings: &LogSettings) {
    let level = if settings.branch_trace {
        "trace"
    } else {
        settings.level.as_str()
    };
    let _ = Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .try_init();
}
