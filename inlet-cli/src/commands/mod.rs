//! CLI command implementations

pub mod import;
pub mod logs;
pub mod recent;
pub mod templates;

use std::path::PathBuf;

use anyhow::{Context, Result};
use inlet_core::{EntryPoint, InletContext, LogEvent, LoggingService};

/// Get the inlet directory from environment or default
pub fn get_inlet_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("INLET_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".inlet")
    }
}

/// Build the core context, creating the inlet directory if needed
pub fn get_context() -> Result<InletContext> {
    let inlet_dir = get_inlet_dir();
    std::fs::create_dir_all(&inlet_dir)
        .with_context(|| format!("Failed to create {}", inlet_dir.display()))?;
    InletContext::new(&inlet_dir)
}

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (logging never blocks an
/// operation)
pub fn get_logger() -> Option<LoggingService> {
    let inlet_dir = get_inlet_dir();
    std::fs::create_dir_all(&inlet_dir).ok()?;
    LoggingService::new(&inlet_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}
