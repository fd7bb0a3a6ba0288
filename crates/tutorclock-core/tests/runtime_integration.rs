//! Integration tests for the session actor.
//!
//! The tokio clock is paused, so interval ticks fire deterministically as
//! soon as every task is idle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tutorclock_core::runtime::spawn;
use tutorclock_core::{
    Command, Event, JsonFileStore, MemoryStore, PersistenceError, Session, Snapshot, SnapshotStore,
};

async fn next(events: &mut UnboundedReceiver<Event>) -> Event {
    events.recv().await.expect("event stream ended")
}

async fn expect_initial_load(events: &mut UnboundedReceiver<Event>) -> Snapshot {
    match next(events).await {
        Event::RosterChanged {
            snapshot,
            initial_load: true,
            ..
        } => snapshot,
        other => panic!("Expected initial RosterChanged, got {other:?}"),
    }
}

fn add(name: &str) -> Command {
    Command::AddEntity {
        name: name.into(),
        course: Some("CS101".into()),
    }
}

fn toggle(name: &str) -> Command {
    Command::ToggleTimer { name: name.into() }
}

async fn expect_tick(events: &mut UnboundedReceiver<Event>, who: &str, total: u64) {
    match next(events).await {
        Event::TickUpdate {
            name, total_seconds, ..
        } => {
            assert_eq!(name, who);
            assert_eq!(total_seconds, total);
        }
        other => panic!("Expected TickUpdate for {who}, got {other:?}"),
    }
}

async fn expect_toggled(events: &mut UnboundedReceiver<Event>, who: &str, now_active: bool) {
    match next(events).await {
        Event::TimerToggled { name, active, .. } => {
            assert_eq!(name, who);
            assert_eq!(active, now_active);
        }
        other => panic!("Expected TimerToggled for {who}, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_switch_accrues_with_real_interval() {
    let (handle, mut events) = spawn(Session::default(), Arc::new(MemoryStore::new()));
    expect_initial_load(&mut events).await;

    handle.send(add("Alice")).unwrap();
    handle.send(add("Bob")).unwrap();
    next(&mut events).await;
    next(&mut events).await;

    handle.send(toggle("Alice")).unwrap();
    expect_toggled(&mut events, "Alice", true).await;
    for total in 1..=3 {
        expect_tick(&mut events, "Alice", total).await;
    }

    handle.send(toggle("Bob")).unwrap();
    expect_toggled(&mut events, "Alice", false).await;
    expect_toggled(&mut events, "Bob", true).await;
    for total in 1..=2 {
        expect_tick(&mut events, "Bob", total).await;
    }

    let session = handle.shutdown(false).await.unwrap();
    assert_eq!(session.entity("Alice").unwrap().total_seconds, 3);
    assert_eq!(session.entity("Bob").unwrap().total_seconds, 2);
}

#[tokio::test(start_paused = true)]
async fn test_remove_active_produces_no_more_ticks() {
    let (handle, mut events) = spawn(Session::default(), Arc::new(MemoryStore::new()));
    expect_initial_load(&mut events).await;

    handle.send(add("Alice")).unwrap();
    next(&mut events).await;
    handle.send(toggle("Alice")).unwrap();
    expect_toggled(&mut events, "Alice", true).await;
    for total in 1..=3 {
        expect_tick(&mut events, "Alice", total).await;
    }

    handle
        .send(Command::RemoveEntity {
            name: "Alice".into(),
        })
        .unwrap();
    match next(&mut events).await {
        Event::RosterChanged { snapshot, .. } => assert!(snapshot.is_empty()),
        other => panic!("Expected RosterChanged, got {other:?}"),
    }

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(events.try_recv().is_err(), "no tick after removing the active entity");

    let session = handle.shutdown(false).await.unwrap();
    assert!(!session.is_ticking());
}

#[tokio::test(start_paused = true)]
async fn test_custom_tick_period() {
    let session = Session::new(Duration::from_millis(100));
    let (handle, mut events) = spawn(session, Arc::new(MemoryStore::new()));
    expect_initial_load(&mut events).await;

    handle.send(add("Alice")).unwrap();
    next(&mut events).await;
    handle.send(toggle("Alice")).unwrap();
    expect_toggled(&mut events, "Alice", true).await;

    let started = tokio::time::Instant::now();
    expect_tick(&mut events, "Alice", 1).await;
    assert_eq!(started.elapsed(), Duration::from_millis(100));
    handle.shutdown(false).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_persist_now_writes_consistent_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.json");
    let store = Arc::new(JsonFileStore::new(&path));
    let (handle, mut events) = spawn(Session::default(), store.clone());
    expect_initial_load(&mut events).await;

    handle.send(add("Alice")).unwrap();
    next(&mut events).await;
    handle.send(Command::PersistNow).unwrap();

    match next(&mut events).await {
        Event::Persisted { entities, .. } => assert_eq!(entities, 1),
        other => panic!("Expected Persisted, got {other:?}"),
    }
    let saved = store.load().unwrap();
    assert_eq!(saved.get("Alice").unwrap().course.as_deref(), Some("CS101"));
    handle.shutdown(false).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_restart_restores_totals_but_not_activity() {
    let store = Arc::new(MemoryStore::new());

    let (handle, mut events) = spawn(Session::default(), store.clone());
    expect_initial_load(&mut events).await;
    handle.send(add("Alice")).unwrap();
    next(&mut events).await;
    handle.send(toggle("Alice")).unwrap();
    expect_toggled(&mut events, "Alice", true).await;
    for total in 1..=5 {
        expect_tick(&mut events, "Alice", total).await;
    }
    handle.shutdown(true).await.unwrap();

    let saved = store.saved().unwrap();
    assert!(saved.get("Alice").unwrap().is_active);

    let (handle, mut events) = spawn(Session::default(), store);
    let snapshot = expect_initial_load(&mut events).await;
    let alice = snapshot.get("Alice").unwrap();
    assert_eq!(alice.total_seconds, 5);
    assert!(!alice.is_active);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(events.try_recv().is_err(), "restored session must not tick");
    handle.shutdown(false).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_without_save_keeps_old_snapshot() {
    let store = Arc::new(MemoryStore::with_snapshot(
        Snapshot::new().with_entity("Alice", Some("CS101"), 2, false),
    ));
    let (handle, mut events) = spawn(Session::default(), store.clone());
    expect_initial_load(&mut events).await;
    handle.send(add("Bob")).unwrap();
    next(&mut events).await;
    handle.shutdown(false).await.unwrap();

    let saved = store.saved().unwrap();
    assert_eq!(saved.len(), 1);
    assert!(saved.get("Bob").is_none());
}

/// Fails every operation, as an unwritable disk would.
struct BrokenStore;

impl SnapshotStore for BrokenStore {
    fn load(&self) -> Result<Snapshot, PersistenceError> {
        Err(PersistenceError::Read {
            path: "broken.json".into(),
            source: std::io::Error::other("disk on fire"),
        })
    }

    fn save(&self, _snapshot: &Snapshot) -> Result<(), PersistenceError> {
        Err(PersistenceError::Write {
            path: "broken.json".into(),
            source: std::io::Error::other("disk on fire"),
        })
    }

    fn location(&self) -> String {
        "broken".into()
    }
}

#[tokio::test(start_paused = true)]
async fn test_persistence_failures_are_not_fatal() {
    let (handle, mut events) = spawn(Session::default(), Arc::new(BrokenStore));

    match next(&mut events).await {
        Event::PersistenceFailed { message, .. } => assert!(message.contains("disk on fire")),
        other => panic!("Expected PersistenceFailed, got {other:?}"),
    }
    let snapshot = expect_initial_load(&mut events).await;
    assert!(snapshot.is_empty());

    handle.send(add("Alice")).unwrap();
    next(&mut events).await;
    handle.send(Command::PersistNow).unwrap();
    assert!(matches!(
        next(&mut events).await,
        Event::PersistenceFailed { .. }
    ));

    handle.send(Command::RequestReload).unwrap();
    match next(&mut events).await {
        Event::RosterChanged { snapshot, .. } => assert!(snapshot.get("Alice").is_some()),
        other => panic!("Expected RosterChanged, got {other:?}"),
    }
    handle.shutdown(false).await.unwrap();
}

/// Panics inside the blocking worker instead of returning an error.
struct PanickingStore;

impl SnapshotStore for PanickingStore {
    fn load(&self) -> Result<Snapshot, PersistenceError> {
        panic!("reader crashed");
    }

    fn save(&self, _snapshot: &Snapshot) -> Result<(), PersistenceError> {
        panic!("writer crashed");
    }

    fn location(&self) -> String {
        "panicking".into()
    }
}

#[tokio::test(start_paused = true)]
async fn test_crashed_storage_worker_is_reported_as_task_failure() {
    let (handle, mut events) = spawn(Session::default(), Arc::new(PanickingStore));

    match next(&mut events).await {
        Event::PersistenceFailed { message, .. } => {
            assert!(message.contains("load task failed"), "{message}");
            assert!(!message.contains("data directory"), "{message}");
        }
        other => panic!("Expected PersistenceFailed, got {other:?}"),
    }
    expect_initial_load(&mut events).await;

    handle.send(Command::PersistNow).unwrap();
    match next(&mut events).await {
        Event::PersistenceFailed { message, .. } => {
            assert!(message.contains("save task failed"), "{message}")
        }
        other => panic!("Expected PersistenceFailed, got {other:?}"),
    }
    handle.shutdown(false).await.unwrap();
}
