//! Snapshots emitted by synchronization sessions

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::models::EventId;
use crate::remote::RemoteError;

/// Sequence number of a synchronization session
///
/// Numbers increase per record kind for the lifetime of a synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SessionId(pub(crate) u64);

impl SessionId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a snapshot's items came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSource {
    /// Local record store, possibly stale
    Cache,
    /// Freshly fetched from the remote API
    Remote,
}

/// Non-fatal problem attached to a remote snapshot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncWarning {
    /// Fresh data was delivered but could not be written to the local store
    #[error("failed to persist fresh data: {0}")]
    PersistFailed(String),

    /// One event of a batch could not be fetched and is missing from the snapshot
    #[error("failed to fetch event {id}: {error}")]
    EventFetchFailed { id: EventId, error: RemoteError },
}

/// One emission of a synchronization session
///
/// Each snapshot replaces whatever the consumer received before it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub session: SessionId,
    pub source: SnapshotSource,
    pub items: Vec<T>,
    pub warnings: Vec<SyncWarning>,
}

impl<T> Snapshot<T> {
    pub(crate) fn cached(session: SessionId, items: Vec<T>) -> Self {
        Self {
            session,
            source: SnapshotSource::Cache,
            items,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn remote(session: SessionId, items: Vec<T>, warnings: Vec<SyncWarning>) -> Self {
        Self {
            session,
            source: SnapshotSource::Remote,
            items,
            warnings,
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.source == SnapshotSource::Remote
    }
}

/// Consumer-side state that applies replace semantics to snapshots
#[derive(Debug, Clone)]
pub struct LatestSnapshot<T> {
    current: Option<Snapshot<T>>,
}

impl<T> LatestSnapshot<T> {
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Replace the held state with `snapshot`
    pub fn apply(&mut self, snapshot: Snapshot<T>) -> &Snapshot<T> {
        self.current.insert(snapshot)
    }

    pub fn items(&self) -> &[T] {
        self.current
            .as_ref()
            .map(|snapshot| snapshot.items.as_slice())
            .unwrap_or_default()
    }

    pub const fn get(&self) -> Option<&Snapshot<T>> {
        self.current.as_ref()
    }

    pub fn into_inner(self) -> Option<Snapshot<T>> {
        self.current
    }
}

impl<T> Default for LatestSnapshot<T> {
    fn default() -> Self {
        Self::new()
    }
}
