//! Async driver for a [`Session`].
//!
//! One task owns the session and processes commands and scheduler ticks one
//! at a time, so no two operations ever interleave. A tokio interval is
//! armed only while the session's scheduler is running.
//!
//! Saves are copied out of the session synchronously and handed to a single
//! writer task, which performs the blocking file I/O off the actor. Writes
//! land in the order they were requested.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::commands::{dispatch, Command};
use crate::error::{CoreError, PersistenceError};
use crate::events::Event;
use crate::roster::Snapshot;
use crate::session::Session;
use crate::storage::SnapshotStore;

enum Request {
    Command(Command),
    Shutdown { save: bool },
}

/// Sending side of a running session.
pub struct SessionHandle {
    requests: mpsc::UnboundedSender<Request>,
    task: JoinHandle<Session>,
}

impl SessionHandle {
    /// Queue a command. Its events arrive on the event receiver.
    ///
    /// # Errors
    /// `SessionClosed` once the actor has stopped.
    pub fn send(&self, command: Command) -> Result<(), CoreError> {
        self.requests
            .send(Request::Command(command))
            .map_err(|_| CoreError::SessionClosed)
    }

    /// Stop the actor after every queued command has been handled.
    ///
    /// With `save` set, one final snapshot is written. Waits for all queued
    /// writes and returns the session's final state.
    ///
    /// # Errors
    /// `SessionClosed` if the actor task panicked or was cancelled.
    pub async fn shutdown(self, save: bool) -> Result<Session, CoreError> {
        // The actor may already be gone; the join below reports that.
        let _ = self.requests.send(Request::Shutdown { save });
        self.task.await.map_err(|_| CoreError::SessionClosed)
    }
}

/// Spawn the session actor on the current tokio runtime.
///
/// The actor first loads the stored snapshot into `session` (clearing any
/// persisted activity) and emits the initial `RosterChanged`. A failed load
/// emits `PersistenceFailed` and continues with an empty roster.
pub fn spawn(
    session: Session,
    store: Arc<dyn SnapshotStore>,
) -> (SessionHandle, mpsc::UnboundedReceiver<Event>) {
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(session, store, request_rx, event_tx));
    (
        SessionHandle {
            requests: request_tx,
            task,
        },
        event_rx,
    )
}

async fn run(
    mut session: Session,
    store: Arc<dyn SnapshotStore>,
    mut requests: mpsc::UnboundedReceiver<Request>,
    events: mpsc::UnboundedSender<Event>,
) -> Session {
    let emit = |event: Event| {
        if events.send(event).is_err() {
            debug!("event receiver dropped");
        }
    };

    let snapshot = match load_blocking(store.clone()).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!(%err, "could not load roster, continuing in memory");
            emit(persistence_failed(&err));
            Snapshot::new()
        }
    };
    emit(session.load(snapshot));

    let writer = SnapshotWriter::spawn(store, events.clone());
    let mut ticker: Option<Interval> = None;

    loop {
        sync_ticker(&session, &mut ticker);

        tokio::select! {
            biased;

            request = requests.recv() => match request {
                Some(Request::Command(Command::PersistNow)) => writer.enqueue(session.snapshot()),
                Some(Request::Command(command)) => {
                    debug!(?command, "command");
                    for event in dispatch(&mut session, command) {
                        emit(event);
                    }
                }
                Some(Request::Shutdown { save }) => {
                    if save {
                        writer.enqueue(session.snapshot());
                    }
                    break;
                }
                None => break,
            },

            _ = next_tick(&mut ticker) => {
                if let Some(event) = session.tick() {
                    emit(event);
                }
            }
        }
    }

    info!("session stopping");
    writer.finish().await;
    session
}

/// Arm or disarm the interval to match the scheduler.
fn sync_ticker(session: &Session, ticker: &mut Option<Interval>) {
    match (session.is_ticking(), ticker.is_some()) {
        (true, false) => {
            let period = session.scheduler().period();
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            *ticker = Some(interval);
        }
        (false, true) => *ticker = None,
        _ => {}
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn load_blocking(store: Arc<dyn SnapshotStore>) -> Result<Snapshot, PersistenceError> {
    tokio::task::spawn_blocking(move || store.load())
        .await
        .unwrap_or_else(|e| Err(task_failed("load", e)))
}

fn task_failed(operation: &'static str, err: tokio::task::JoinError) -> PersistenceError {
    PersistenceError::Task {
        operation,
        message: err.to_string(),
    }
}

fn persistence_failed(err: &PersistenceError) -> Event {
    Event::PersistenceFailed {
        message: err.to_string(),
        at: Utc::now(),
    }
}

/// FIFO writer: one save at a time, in request order.
struct SnapshotWriter {
    queue: mpsc::UnboundedSender<Snapshot>,
    task: JoinHandle<()>,
}

impl SnapshotWriter {
    fn spawn(store: Arc<dyn SnapshotStore>, events: mpsc::UnboundedSender<Event>) -> Self {
        let (queue, mut pending) = mpsc::unbounded_channel::<Snapshot>();
        let task = tokio::spawn(async move {
            while let Some(snapshot) = pending.recv().await {
                let entities = snapshot.len();
                let location = store.location();
                let store = store.clone();
                let result = tokio::task::spawn_blocking(move || store.save(&snapshot))
                    .await
                    .unwrap_or_else(|e| Err(task_failed("save", e)));
                let event = match result {
                    Ok(()) => Event::Persisted {
                        path: location,
                        entities,
                        at: Utc::now(),
                    },
                    Err(err) => {
                        warn!(%err, "save failed, roster kept in memory");
                        persistence_failed(&err)
                    }
                };
                let _ = events.send(event);
            }
        });
        Self { queue, task }
    }

    fn enqueue(&self, snapshot: Snapshot) {
        debug!(entities = snapshot.len(), "save requested");
        if self.queue.send(snapshot).is_err() {
            warn!("snapshot writer is gone, save dropped");
        }
    }

    /// Close the queue and wait for pending writes.
    async fn finish(self) {
        drop(self.queue);
        if let Err(e) = self.task.await {
            warn!(error = %e, "snapshot writer ended abnormally");
        }
    }
}
