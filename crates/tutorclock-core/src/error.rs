//! Core error types for tutorclock-core.
//!
//! Roster and timer errors are local and returned to the immediate caller.
//! Persistence errors are non-fatal: the in-memory roster stays authoritative.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tutorclock-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Roster and timer errors
    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    /// Snapshot read/write errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The session actor has shut down and can no longer accept commands
    #[error("Session is closed")]
    SessionClosed,
}

/// Errors raised by roster mutations and timer toggles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("entity name must not be empty")]
    EmptyName,

    #[error("'{0}' already exists, choose a different name.")]
    DuplicateName(String),

    #[error("'{0}' is not on the roster")]
    EntityNotFound(String),
}

/// Durable-storage failures.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to read snapshot at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write snapshot to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot at {path} is not valid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The blocking worker running a load or save died before finishing.
    #[error("Snapshot {operation} task failed: {message}")]
    Task {
        operation: &'static str,
        message: String,
    },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
