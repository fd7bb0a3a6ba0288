mod config;
mod snapshot_store;

pub use config::{Config, CourseConfig, StorageConfig, TimerConfig};
pub use snapshot_store::{JsonFileStore, MemoryStore, SnapshotStore};

use std::path::PathBuf;

/// Returns `~/.config/tutorclock[-dev]/` based on TUTORCLOCK_ENV.
///
/// Set TUTORCLOCK_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TUTORCLOCK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("tutorclock-dev")
    } else {
        base_dir.join("tutorclock")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
