use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::roster::Snapshot;

/// Every state change in the session produces an Event.
/// Events leave the session in the order the transitions happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Current course context, sent on request and after every change.
    CourseChanged {
        course: Option<String>,
        at: DateTime<Utc>,
    },
    /// An add request named an entity that already exists.
    EntityAddConflict {
        name: String,
        message: String,
        at: DateTime<Utc>,
    },
    /// A toggle request named an entity that is not on the roster.
    EntityNotFound {
        name: String,
        at: DateTime<Utc>,
    },
    /// Full roster state. `initial_load` is set only for the post-load copy.
    RosterChanged {
        snapshot: Snapshot,
        initial_load: bool,
        at: DateTime<Utc>,
    },
    TimerToggled {
        name: String,
        active: bool,
        at: DateTime<Utc>,
    },
    TickUpdate {
        name: String,
        total_seconds: u64,
        at: DateTime<Utc>,
    },
    /// A save finished and the snapshot is durable.
    Persisted {
        path: String,
        entities: usize,
        at: DateTime<Utc>,
    },
    /// A load or save failed; the in-memory roster remains authoritative.
    PersistenceFailed {
        message: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine-friendly name of the variant, handy for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::CourseChanged { .. } => "course_changed",
            Event::EntityAddConflict { .. } => "entity_add_conflict",
            Event::EntityNotFound { .. } => "entity_not_found",
            Event::RosterChanged { .. } => "roster_changed",
            Event::TimerToggled { .. } => "timer_toggled",
            Event::TickUpdate { .. } => "tick_update",
            Event::Persisted { .. } => "persisted",
            Event::PersistenceFailed { .. } => "persistence_failed",
        }
    }
}
