use tutorclock_core::{format_duration, Event, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable lines. Per-second tick updates are not printed.
    Text,
    /// One JSON object per event.
    Json,
}

/// Render an event, or `None` if this mode does not show it.
pub fn render_event(event: &Event, mode: OutputMode) -> Option<String> {
    if mode == OutputMode::Json {
        return serde_json::to_string(event).ok();
    }

    match event {
        Event::CourseChanged { course, .. } => Some(format!(
            "course: {}",
            course.as_deref().unwrap_or("(none)")
        )),
        Event::EntityAddConflict { message, .. } => Some(message.clone()),
        Event::EntityNotFound { name, .. } => Some(format!("'{name}' is not on the roster")),
        Event::RosterChanged {
            snapshot,
            initial_load,
            ..
        } => {
            let table = render_roster(snapshot);
            if *initial_load {
                Some(format!("loaded {} entries\n{table}", snapshot.len()))
            } else {
                Some(table)
            }
        }
        Event::TimerToggled { name, active, .. } => Some(if *active {
            format!("{name}: started")
        } else {
            format!("{name}: stopped")
        }),
        Event::TickUpdate { .. } => None,
        Event::Persisted { path, entities, .. } => {
            Some(format!("saved {entities} entries to {path}"))
        }
        Event::PersistenceFailed { message, .. } => Some(format!("warning: {message}")),
    }
}

/// Fixed-width roster table in roster order. Active rows are starred.
pub fn render_roster(snapshot: &Snapshot) -> String {
    if snapshot.is_empty() {
        return "(roster is empty)".to_string();
    }
    let width = snapshot
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut lines = Vec::with_capacity(snapshot.len() + 1);
    lines.push(format!("  {:<width$}  {:<10}  {:>8}", "NAME", "COURSE", "TIME"));
    for (name, record) in snapshot.iter() {
        let marker = if record.is_active { '*' } else { ' ' };
        lines.push(format!(
            "{marker} {name:<width$}  {:<10}  {:>8}",
            record.course.as_deref().unwrap_or("-"),
            format_duration(record.total_seconds),
        ));
    }
    lines.join("\n")
}
