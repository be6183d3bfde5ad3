//! CLI command implementations

pub mod balance;
pub mod login;
pub mod logout;
pub mod logs;
pub mod send;
pub mod setup;
pub mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use keyline_core::services::{EntryPoint, LogEvent, LoggingService};
use keyline_core::KeylineContext;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let keyline_dir = get_keyline_dir();
    std::fs::create_dir_all(&keyline_dir).ok()?;
    LoggingService::new(&keyline_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the keyline directory from environment or default
pub fn get_keyline_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("KEYLINE_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .expect("Could not find home directory")
            .join(".keyline")
    }
}

/// Get or create keyline context
pub fn get_context(entry_point: EntryPoint) -> Result<KeylineContext> {
    let keyline_dir = get_keyline_dir();

    std::fs::create_dir_all(&keyline_dir)
        .with_context(|| format!("Failed to create keyline directory: {:?}", keyline_dir))?;

    KeylineContext::new(&keyline_dir, entry_point, env!("CARGO_PKG_VERSION"))
        .context("Failed to initialize keyline context")
}
