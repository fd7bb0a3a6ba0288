//! Durable storage for roster snapshots.
//!
//! A missing record is a valid initial state and loads as an empty roster.
//! Saves go through a temp file in the target directory followed by an
//! atomic rename, so a failed save leaves the previous snapshot intact.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::error::PersistenceError;
use crate::roster::Snapshot;

/// Where snapshots live. Implementations must be callable from a blocking
/// worker thread, hence `Send + Sync`.
pub trait SnapshotStore: Send + Sync {
    /// Read the stored snapshot, or an empty one if nothing was saved yet.
    fn load(&self) -> Result<Snapshot, PersistenceError>;

    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError>;

    /// Human-readable location for logs and events.
    fn location(&self) -> String;
}

/// Pretty-printed JSON file, e.g. `~/.config/tutorclock/roster.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_err(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Snapshot, PersistenceError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot on disk, starting empty");
                return Ok(Snapshot::new());
            }
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Snapshot::new());
        }

        let snapshot: Snapshot =
            serde_json::from_str(&content).map_err(|source| PersistenceError::Parse {
                path: self.path.clone(),
                source,
            })?;
        info!(path = %self.path.display(), entities = snapshot.len(), "snapshot read");
        Ok(snapshot)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let content = serde_json::to_string_pretty(snapshot)?;

        // Temp file in the same directory so the rename stays on one filesystem.
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| self.write_err(e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| self.write_err(e))?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| self.write_err(e))?;
        tmp.as_file().sync_all().map_err(|e| self.write_err(e))?;
        tmp.persist(&self.path).map_err(|e| self.write_err(e.error))?;

        info!(path = %self.path.display(), entities = snapshot.len(), "snapshot saved");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process store, for tests and for running without a data directory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
        }
    }

    /// The last saved snapshot, if any.
    pub fn saved(&self) -> Option<Snapshot> {
        self.slot().clone()
    }

    /// A panic elsewhere never leaves a half-written snapshot behind, since
    /// the slot is replaced whole. Poisoning is therefore ignored on both
    /// the read and the write path.
    fn slot(&self) -> MutexGuard<'_, Option<Snapshot>> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Snapshot, PersistenceError> {
        Ok(self.saved().unwrap_or_default())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        *self.slot() = Some(snapshot.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
