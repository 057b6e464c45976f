mod config;
pub mod durable;
pub mod schedule_store;

pub use config::{EngineConfig, OneShotPolicy};
pub use durable::{DurableStore, JsonFileStore, MemoryStore};
pub use schedule_store::ScheduleStore;

use std::path::PathBuf;

/// Returns `~/.config/ringer[-dev]/` based on RINGER_ENV.
///
/// Set RINGER_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("RINGER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("ringer-dev")
    } else {
        base_dir.join("ringer")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
