//! Operator commands accepted by a running session.

use serde::{Deserialize, Serialize};

use crate::error::RosterError;
use crate::events::Event;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    GetCurrentCourse,
    SetCurrentCourse { course: Option<String> },
    AddEntity { name: String, course: Option<String> },
    RemoveEntity { name: String },
    ToggleTimer { name: String },
    /// Re-emit the in-memory roster. Storage is not re-read.
    RequestReload,
    /// Save the current roster. Handled by the runtime, which owns the store.
    PersistNow,
}

/// Apply a command to the session and return the events it produced.
///
/// Roster errors become events for the presentation layer. `PersistNow`
/// needs I/O and produces nothing here.
pub fn dispatch(session: &mut Session, command: Command) -> Vec<Event> {
    match command {
        Command::GetCurrentCourse => vec![session.course_event()],
        Command::SetCurrentCourse { course } => vec![session.set_current_course(course)],
        Command::AddEntity { name, course } => match session.add_entity(&name, course) {
            Ok(event) => vec![event],
            Err(err) => vec![rejection(&name, err)],
        },
        Command::RemoveEntity { name } => session.remove_entity(&name).into_iter().collect(),
        Command::ToggleTimer { name } => match session.toggle_timer(&name) {
            Ok(events) => events,
            Err(err) => vec![rejection(&name, err)],
        },
        Command::RequestReload => vec![session.reload()],
        Command::PersistNow => Vec::new(),
    }
}

fn rejection(name: &str, err: RosterError) -> Event {
    tracing::debug!(name, %err, "command rejected");
    let at = chrono::Utc::now();
    match err {
        RosterError::EntityNotFound(name) => Event::EntityNotFound { name, at },
        RosterError::DuplicateName(_) | RosterError::EmptyName => Event::EntityAddConflict {
            name: name.trim().to_string(),
            message: err.to_string(),
            at,
        },
    }
}
