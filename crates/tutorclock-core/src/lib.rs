//! # tutorclock Core Library
//!
//! Tracks time spent with each entity on a roster (typically students) using a
//! single stopwatch that can be pointed at one entity at a time. Accrued totals
//! survive restarts through explicit snapshots; activity never does.
//!
//! ## Architecture
//!
//! - **Roster**: insertion-ordered CRUD over entities and their totals
//! - **Session**: the timer controller; owns the roster, the single active
//!   pointer and the tick scheduler, and turns every transition into an
//!   [`Event`]
//! - **Tick scheduler**: running/stopped flag driven only by activation
//!   transitions; the caller delivers ticks
//! - **Storage**: JSON roster snapshots written atomically, TOML configuration
//! - **Runtime**: tokio actor that serializes commands and ticks for one
//!   session
//!
//! ## Key Components
//!
//! - [`Session`]: timer session controller
//! - [`Roster`] / [`Snapshot`]: live and persisted roster state
//! - [`SnapshotStore`]: persistence seam, implemented by [`JsonFileStore`]
//! - [`runtime::spawn`]: run a session with a real clock

pub mod commands;
pub mod error;
pub mod events;
pub mod roster;
pub mod runtime;
pub mod session;
pub mod storage;
pub mod timer;

pub use commands::{dispatch, Command};
pub use error::{ConfigError, CoreError, PersistenceError, RosterError};
pub use events::Event;
pub use roster::{Entity, EntityRecord, Roster, Snapshot};
pub use runtime::SessionHandle;
pub use session::Session;
pub use storage::{Config, JsonFileStore, MemoryStore, SnapshotStore};
pub use timer::{format_duration, TickScheduler, DEFAULT_TICK_PERIOD};
