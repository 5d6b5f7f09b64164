//! Local-first event synchronization.
//!
//! Every `synchronize_*` call starts one session: the cached records are
//! emitted right away, then a background task checks connectivity, fetches
//! fresh data, replaces the local records and emits the fresh snapshot as
//! the final item. Offline sessions end cleanly after the cached emission.
//!
//! Both operations spawn onto the current tokio runtime and must be called
//! from within one.

mod session;
mod snapshot;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::connectivity::Connectivity;
use crate::db::EventStore;
use crate::models::{Event, EventId, TournamentId};
use crate::remote::{RemoteError, RemoteEventSource};

use session::SessionLedger;
pub use session::{SyncItem, SyncSession};
pub use snapshot::{LatestSnapshot, SessionId, Snapshot, SnapshotSource, SyncWarning};

/// Room for the cached and the remote snapshot (or the terminal error)
const SESSION_BUFFER: usize = 2;

/// Terminal failure of a synchronization session
///
/// Snapshots delivered before the failure remain valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Reconciles the local record store with the remote event source
#[derive(Clone)]
pub struct EventSynchronizer {
    store: Arc<dyn EventStore>,
    remote: Arc<dyn RemoteEventSource>,
    connectivity: Arc<dyn Connectivity>,
    id_sessions: Arc<SessionLedger>,
    event_sessions: Arc<SessionLedger>,
}

impl EventSynchronizer {
    pub fn new(
        store: Arc<dyn EventStore>,
        remote: Arc<dyn RemoteEventSource>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        Self {
            store,
            remote,
            connectivity,
            id_sessions: Arc::new(SessionLedger::default()),
            event_sessions: Arc::new(SessionLedger::default()),
        }
    }

    /// Synchronize the tournament's current event identifiers
    pub fn synchronize_event_ids(&self, tournament: TournamentId) -> SyncSession<EventId> {
        let id = self.id_sessions.begin();
        let (sender, receiver) = mpsc::channel(SESSION_BUFFER);

        match self.store.all_event_ids() {
            Ok(cached) if !cached.is_empty() => {
                tracing::debug!("Session {id}: {} cached event ids", cached.len());
                // A fresh channel always has room for the first item
                let _ = sender.try_send(Ok(Snapshot::cached(id, cached)));
            }
            Ok(_) => {}
            Err(error) => tracing::warn!("Session {id}: failed to read cached event ids: {error}"),
        }

        let task = SessionTask {
            id,
            sender,
            ledger: Arc::clone(&self.id_sessions),
        };
        let store = Arc::clone(&self.store);
        let remote = Arc::clone(&self.remote);
        let connectivity = Arc::clone(&self.connectivity);

        let handle = tokio::spawn(async move {
            if !task.is_online(connectivity).await {
                return;
            }

            match remote.list_event_ids(&tournament).await {
                Ok(fresh) => {
                    task.finish(
                        unique_in_order(fresh),
                        Vec::new(),
                        |ids| store.replace_event_ids(ids),
                        |ids| ids,
                    )
                    .await;
                }
                Err(error) => task.fail(error).await,
            }
        });

        SyncSession::new(id, receiver, Some(handle))
    }

    /// Synchronize full details for the given events
    ///
    /// Repeated identifiers are fetched once. Events that fail to fetch are
    /// reported as [`SyncWarning::EventFetchFailed`] on the fresh snapshot;
    /// the session only fails when every fetch failed. Losing connectivity
    /// stops the batch; events fetched before that are still kept.
    pub fn synchronize_events(
        &self,
        ids: impl IntoIterator<Item = EventId>,
    ) -> SyncSession<Event> {
        let id = self.event_sessions.begin();
        let (sender, receiver) = mpsc::channel(SESSION_BUFFER);

        let ids = unique_in_order(ids);
        if ids.is_empty() {
            tracing::debug!("Session {id}: no events requested");
            return SyncSession::new(id, receiver, None);
        }

        match self.store.all_events() {
            Ok(cached) => {
                let cached = select_in_order(cached, &ids);
                if !cached.is_empty() {
                    tracing::debug!("Session {id}: {} cached events", cached.len());
                    let _ = sender.try_send(Ok(Snapshot::cached(id, cached)));
                }
            }
            Err(error) => tracing::warn!("Session {id}: failed to read cached events: {error}"),
        }

        let task = SessionTask {
            id,
            sender,
            ledger: Arc::clone(&self.event_sessions),
        };
        let store = Arc::clone(&self.store);
        let remote = Arc::clone(&self.remote);
        let connectivity = Arc::clone(&self.connectivity);

        let handle = tokio::spawn(async move {
            if !task.is_online(connectivity).await {
                return;
            }

            let mut fetched = Vec::with_capacity(ids.len());
            let mut failures = Vec::new();
            for (index, &event_id) in ids.iter().enumerate() {
                if task.sender.is_closed() {
                    tracing::debug!("Session {}: abandoned mid-batch", task.id);
                    return;
                }

                match remote.fetch_event(event_id).await {
                    Ok(event) => fetched.push(event),
                    Err(RemoteError::NoConnectivity) => {
                        tracing::debug!(
                            "Session {}: connectivity lost after {} of {} events",
                            task.id,
                            fetched.len(),
                            ids.len()
                        );
                        failures.extend(
                            ids[index..]
                                .iter()
                                .map(|&id| (id, RemoteError::NoConnectivity)),
                        );
                        break;
                    }
                    Err(error) => {
                        tracing::warn!("Session {}: event {event_id} failed: {error}", task.id);
                        failures.push((event_id, error));
                    }
                }
            }

            if fetched.is_empty() {
                if let Some((_, error)) = failures.into_iter().next() {
                    task.fail(error).await;
                }
                return;
            }

            let warnings = failures
                .into_iter()
                .map(|(id, error)| SyncWarning::EventFetchFailed { id, error })
                .collect();
            task.finish(
                fetched,
                warnings,
                |events| store.replace_events(events),
                |events| apply_favourites(store.as_ref(), events),
            )
            .await;
        });

        SyncSession::new(id, receiver, Some(handle))
    }
}

/// Background half of a session
struct SessionTask<T> {
    id: SessionId,
    sender: mpsc::Sender<SyncItem<T>>,
    ledger: Arc<SessionLedger>,
}

impl<T: Send + 'static> SessionTask<T> {
    /// Evaluate connectivity off the async workers; probes may block
    async fn is_online(&self, connectivity: Arc<dyn Connectivity>) -> bool {
        let online = tokio::task::spawn_blocking(move || connectivity.is_online())
            .await
            .unwrap_or(false);
        if !online {
            tracing::debug!("Session {}: offline, keeping cached data", self.id);
        }
        online
    }

    /// End the session after a remote failure
    ///
    /// Missing connectivity is not a failure and ends the session cleanly.
    async fn fail(self, error: RemoteError) {
        if error == RemoteError::NoConnectivity {
            tracing::debug!("Session {}: offline, keeping cached data", self.id);
            return;
        }
        tracing::warn!("Session {}: remote fetch failed: {error}", self.id);
        let _ = self.sender.send(Err(SyncError::Remote(error))).await;
    }

    /// Persist `items` (unless superseded) and emit them as the final snapshot
    ///
    /// `present` runs after the write and shapes the emitted items.
    async fn finish(
        self,
        items: Vec<T>,
        mut warnings: Vec<SyncWarning>,
        persist: impl FnOnce(&[T]) -> crate::Result<()>,
        present: impl FnOnce(Vec<T>) -> Vec<T>,
    ) {
        if self.sender.is_closed() {
            tracing::debug!("Session {}: abandoned, discarding fresh data", self.id);
            return;
        }

        match self.ledger.commit(self.id, || persist(&items)) {
            None => {
                tracing::warn!(
                    "Session {}: superseded by a newer session, discarding fresh data",
                    self.id
                );
                return;
            }
            Some(Err(error)) => {
                tracing::warn!("Session {}: failed to persist fresh data: {error}", self.id);
                warnings.push(SyncWarning::PersistFailed(error.to_string()));
            }
            Some(Ok(())) => {}
        }

        let items = present(items);
        tracing::info!("Session {}: synchronized {} records", self.id, items.len());
        let _ = self
            .sender
            .send(Ok(Snapshot::remote(self.id, items, warnings)))
            .await;
    }
}

fn unique_in_order(ids: impl IntoIterator<Item = EventId>) -> Vec<EventId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Cached events whose ids were requested, in request order
fn select_in_order(cached: Vec<Event>, ids: &[EventId]) -> Vec<Event> {
    let mut by_id: HashMap<EventId, Event> =
        cached.into_iter().map(|event| (event.id, event)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

/// Set each event's favourite flag from the store
fn apply_favourites(store: &dyn EventStore, events: Vec<Event>) -> Vec<Event> {
    let favourites: HashSet<EventId> = match store.favourite_ids() {
        Ok(ids) => ids.into_iter().collect(),
        Err(error) => {
            tracing::warn!("Failed to read favourite events: {error}");
            return events;
        }
    };

    events
        .into_iter()
        .map(|event| {
            let favourite = favourites.contains(&event.id);
            event.with_favourite(favourite)
        })
        .collect()
}
