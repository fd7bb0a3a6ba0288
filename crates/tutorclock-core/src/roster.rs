//! Roster of tracked entities.
//!
//! The roster is plain CRUD over an insertion-ordered map. It knows nothing
//! about timing: the activity flag and the accrued counter are only touched
//! through crate-private methods called by [`Session`](crate::Session).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::RosterError;

/// A tracked name with its course tag and accrued time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub course: Option<String>,
    pub total_seconds: u64,
    pub is_active: bool,
}

impl Entity {
    fn new(name: String, course: Option<String>) -> Self {
        Self {
            name,
            course,
            total_seconds: 0,
            is_active: false,
        }
    }
}

/// Persisted form of a single entity. The name is the key in [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub total_seconds: u64,
    /// Written for human inspection only; never trusted on load.
    #[serde(default)]
    pub is_active: bool,
}

/// Point-in-time copy of the whole roster, keyed by name in roster order.
///
/// Serializes as a plain JSON object:
///
/// ```text
/// { "Alice": { "course": "CS101", "total_seconds": 5, "is_active": false } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    entities: IndexMap<String, EntityRecord>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly useful for seeding tests and imports.
    pub fn with_entity(
        mut self,
        name: impl Into<String>,
        course: Option<&str>,
        total_seconds: u64,
        is_active: bool,
    ) -> Self {
        self.entities.insert(
            name.into(),
            EntityRecord {
                course: course.map(str::to_string),
                total_seconds,
                is_active,
            },
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&EntityRecord> {
        self.entities.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityRecord)> {
        self.entities.iter().map(|(name, record)| (name.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Insertion-ordered set of entities keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entities: IndexMap<String, Entity>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a roster from a snapshot, copying every field verbatim.
    ///
    /// Entries whose key is blank are dropped. Keys that collide once trimmed
    /// (`"Alice"` and `" Alice"` in a hand-edited file) keep the first record.
    /// Activity flags are copied as-is; clearing them is the session's job.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut entities = IndexMap::with_capacity(snapshot.len());
        for (key, record) in snapshot.entities {
            let name = key.trim().to_string();
            if name.is_empty() {
                tracing::warn!("skipping snapshot entry with an empty name");
                continue;
            }
            if entities.contains_key(&name) {
                tracing::warn!(
                    key = %key,
                    name = %name,
                    total_seconds = record.total_seconds,
                    "skipping snapshot entry that duplicates an earlier name"
                );
                continue;
            }
            entities.insert(
                name.clone(),
                Entity {
                    name,
                    course: record.course,
                    total_seconds: record.total_seconds,
                    is_active: record.is_active,
                },
            );
        }
        Self { entities }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    /// Entities in insertion order.
    pub fn list(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            entities: self
                .entities
                .values()
                .map(|e| {
                    (
                        e.name.clone(),
                        EntityRecord {
                            course: e.course.clone(),
                            total_seconds: e.total_seconds,
                            is_active: e.is_active,
                        },
                    )
                })
                .collect(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Insert a new idle entity with a zero total.
    ///
    /// # Errors
    /// `EmptyName` for a blank name, `DuplicateName` if the name is taken.
    /// The roster is unchanged on error.
    pub fn add(&mut self, name: &str, course: Option<String>) -> Result<&Entity, RosterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::EmptyName);
        }
        if self.entities.contains_key(name) {
            return Err(RosterError::DuplicateName(name.to_string()));
        }
        let (index, _) = self
            .entities
            .insert_full(name.to_string(), Entity::new(name.to_string(), course));
        Ok(&self.entities[index])
    }

    /// Remove an entity, returning it if it existed.
    ///
    /// Uses `shift_remove` so the remaining entries keep their order.
    pub fn remove(&mut self, name: &str) -> Option<Entity> {
        self.entities.shift_remove(name)
    }

    pub(crate) fn set_active(&mut self, name: &str, active: bool) -> bool {
        match self.entities.get_mut(name) {
            Some(entity) => {
                entity.is_active = active;
                true
            }
            None => false,
        }
    }

    /// Clear every activity flag. Returns the names that were active.
    pub(crate) fn deactivate_all(&mut self) -> Vec<String> {
        self.entities
            .values_mut()
            .filter(|e| e.is_active)
            .map(|e| {
                e.is_active = false;
                e.name.clone()
            })
            .collect()
    }

    /// Add one second to an entity's total. Returns the new total.
    pub(crate) fn credit(&mut self, name: &str) -> Option<u64> {
        let entity = self.entities.get_mut(name)?;
        entity.total_seconds = entity.total_seconds.saturating_add(1);
        Some(entity.total_seconds)
    }
}
