//! Timer session controller.
//!
//! One stopwatch, pointed at no more than one roster entity at a time. The
//! session owns the roster, the active pointer, the course context and the
//! tick scheduler; every mutation goes through its methods and returns the
//! events it produced, in order.
//!
//! ## Per-entity transitions
//!
//! ```text
//! Idle -> Active      toggle (any previous holder goes Idle first)
//! Active -> Idle      toggle again, another entity toggled, or removal
//! ```
//!
//! The scheduler runs exactly while some entity is active.
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = Session::new(DEFAULT_TICK_PERIOD);
//! session.add_entity("Alice", Some("CS101".into()))?;
//! session.toggle_timer("Alice")?;
//! // Once per scheduler period:
//! session.tick(); // Some(Event::TickUpdate { .. }) while Alice is active
//! ```

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::RosterError;
use crate::events::Event;
use crate::roster::{Entity, Roster, Snapshot};
use crate::timer::TickScheduler;

#[derive(Debug, Clone)]
pub struct Session {
    roster: Roster,
    active: Option<String>,
    current_course: Option<String>,
    scheduler: TickScheduler,
}

impl Session {
    /// An empty session with no course context and a stopped scheduler.
    pub fn new(tick_period: Duration) -> Self {
        Self {
            roster: Roster::new(),
            active: None,
            current_course: None,
            scheduler: TickScheduler::new(tick_period),
        }
    }

    /// Seed the course context, e.g. from configuration.
    pub fn with_course(mut self, course: Option<String>) -> Self {
        self.current_course = normalize_course(course);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.roster.get(name.trim())
    }

    /// Name of the entity currently accruing time.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn current_course(&self) -> Option<&str> {
        self.current_course.as_deref()
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    pub fn is_ticking(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Consistent point-in-time copy of the roster.
    pub fn snapshot(&self) -> Snapshot {
        self.roster.snapshot()
    }

    /// Current course context as an event.
    pub fn course_event(&self) -> Event {
        Event::CourseChanged {
            course: self.current_course.clone(),
            at: Utc::now(),
        }
    }

    /// Current roster as a non-initial `RosterChanged`. Does not touch storage.
    pub fn reload(&self) -> Event {
        self.roster_changed(false)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the course context. A blank course clears it.
    pub fn set_current_course(&mut self, course: Option<String>) -> Event {
        self.current_course = normalize_course(course);
        debug!(course = ?self.current_course, "course context updated");
        self.course_event()
    }

    /// Add an idle entity. Without an explicit course the current course
    /// context is used.
    ///
    /// # Errors
    /// `DuplicateName` or `EmptyName`; the roster is unchanged.
    pub fn add_entity(&mut self, name: &str, course: Option<String>) -> Result<Event, RosterError> {
        let course = normalize_course(course).or_else(|| self.current_course.clone());
        let entity = self.roster.add(name, course)?;
        debug!(name = %entity.name, course = ?entity.course, "entity added");
        Ok(self.roster_changed(false))
    }

    /// Remove an entity. Absent names are ignored and produce no event.
    ///
    /// Removing the active entity clears the active pointer and stops the
    /// scheduler before the roster event is emitted.
    pub fn remove_entity(&mut self, name: &str) -> Option<Event> {
        let removed = self.roster.remove(name.trim())?;
        if self.active.as_deref() == Some(removed.name.as_str()) {
            self.active = None;
            self.stop_scheduler();
            debug!(name = %removed.name, total_seconds = removed.total_seconds, "active entity removed");
        } else {
            debug!(name = %removed.name, "entity removed");
        }
        Some(self.roster_changed(false))
    }

    /// Start or stop accruing time for `name`.
    ///
    /// Toggling the active entity stops it. Toggling any other entity first
    /// stops the current holder, then activates `name`; the two
    /// `TimerToggled` events come out in that order.
    ///
    /// # Errors
    /// `EntityNotFound` if `name` is not on the roster. Nothing changes.
    pub fn toggle_timer(&mut self, name: &str) -> Result<Vec<Event>, RosterError> {
        let name = name.trim();
        if !self.roster.contains(name) {
            return Err(RosterError::EntityNotFound(name.to_string()));
        }

        let mut events = Vec::with_capacity(2);

        if self.active.as_deref() == Some(name) {
            self.active = None;
            self.deactivate(name, &mut events);
            self.stop_scheduler();
            debug!(name, "direct stop");
            return Ok(events);
        }

        if let Some(prev) = self.active.take() {
            self.deactivate(&prev, &mut events);
            debug!(prev = %prev, next = name, "indirect stop");
        }

        self.roster.set_active(name, true);
        self.active = Some(name.to_string());
        events.push(Event::TimerToggled {
            name: name.to_string(),
            active: true,
            at: Utc::now(),
        });
        if self.scheduler.start() {
            debug!(period_ms = self.scheduler.period().as_millis() as u64, "tick scheduler started");
        }
        debug!(name, "timer started");
        Ok(events)
    }

    /// Credit one period to the active entity.
    ///
    /// Returns `None` when the scheduler is stopped; a stray tick after the
    /// last deactivation credits nobody.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.scheduler.is_running() {
            return None;
        }
        let Some(name) = self.active.as_deref() else {
            self.stop_scheduler();
            return None;
        };
        let total_seconds = self.roster.credit(name)?;
        Some(Event::TickUpdate {
            name: name.to_string(),
            total_seconds,
            at: Utc::now(),
        })
    }

    /// Replace the roster with a persisted snapshot.
    ///
    /// No timer survives a restart: every activity flag is cleared, the
    /// active pointer is dropped and the scheduler stopped before the
    /// initial `RosterChanged` is built.
    pub fn load(&mut self, snapshot: Snapshot) -> Event {
        self.roster = Roster::from_snapshot(snapshot);
        let stale = self.roster.deactivate_all();
        if !stale.is_empty() {
            debug!(?stale, "cleared persisted activity flags");
        }
        self.active = None;
        self.stop_scheduler();
        info!(entities = self.roster.len(), "roster loaded");
        self.roster_changed(true)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn deactivate(&mut self, name: &str, events: &mut Vec<Event>) {
        self.roster.set_active(name, false);
        events.push(Event::TimerToggled {
            name: name.to_string(),
            active: false,
            at: Utc::now(),
        });
    }

    fn stop_scheduler(&mut self) {
        if self.scheduler.stop() {
            debug!("tick scheduler stopped");
        }
    }

    fn roster_changed(&self, initial_load: bool) -> Event {
        Event::RosterChanged {
            snapshot: self.roster.snapshot(),
            initial_load,
            at: Utc::now(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(crate::timer::DEFAULT_TICK_PERIOD)
    }
}

fn normalize_course(course: Option<String>) -> Option<String> {
    course
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}
