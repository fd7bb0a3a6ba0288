pub mod config;
pub mod roster;
pub mod run;

use std::path::PathBuf;

use tutorclock_core::{Config, JsonFileStore};

/// Snapshot store at `--roster-file`, or wherever the config points.
pub fn open_store(
    roster_file: Option<PathBuf>,
    config: &Config,
) -> Result<JsonFileStore, Box<dyn std::error::Error>> {
    let path = match roster_file {
        Some(path) => path,
        None => config.roster_path()?,
    };
    Ok(JsonFileStore::new(path))
}
