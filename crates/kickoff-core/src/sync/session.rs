//! Session handles and cross-session write ordering

use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::snapshot::{LatestSnapshot, SessionId, Snapshot};
use super::SyncError;

/// Item yielded by a [`SyncSession`]
pub type SyncItem<T> = Result<Snapshot<T>, SyncError>;

/// A running synchronization session
///
/// Yields at most two snapshots (cache, then remote) and then ends, either
/// cleanly or with a single error. Dropping the session cancels its
/// background task.
#[derive(Debug)]
pub struct SyncSession<T> {
    id: SessionId,
    receiver: mpsc::Receiver<SyncItem<T>>,
    task: Option<JoinHandle<()>>,
}

impl<T> SyncSession<T> {
    pub(crate) const fn new(
        id: SessionId,
        receiver: mpsc::Receiver<SyncItem<T>>,
        task: Option<JoinHandle<()>>,
    ) -> Self {
        Self { id, receiver, task }
    }

    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Wait for the next snapshot; `None` once the session has ended
    pub async fn recv(&mut self) -> Option<SyncItem<T>> {
        self.receiver.recv().await
    }

    /// Abort the background task
    ///
    /// Snapshots already queued are still delivered; nothing further is
    /// fetched or written to the store.
    pub fn cancel(&self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// Drain the session and keep only the last snapshot
    ///
    /// On error the snapshot delivered before the failure is dropped; use
    /// [`SyncSession::recv`] to observe it.
    pub async fn collect_latest(mut self) -> Result<Option<Snapshot<T>>, SyncError> {
        let mut latest = LatestSnapshot::new();
        while let Some(item) = self.recv().await {
            latest.apply(item?);
        }
        Ok(latest.into_inner())
    }
}

impl<T> Unpin for SyncSession<T> {}

impl<T> Stream for SyncSession<T> {
    type Item = SyncItem<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl<T> Drop for SyncSession<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Hands out session numbers and rejects writes from superseded sessions
///
/// A session may write only when no newer session of the same kind has
/// already committed (last writer wins by session number).
#[derive(Debug, Default)]
pub(crate) struct SessionLedger {
    next: AtomicU64,
    committed: Mutex<u64>,
}

impl SessionLedger {
    pub(crate) fn begin(&self) -> SessionId {
        SessionId(self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Run `write` unless a newer session already committed
    ///
    /// Returns `None` when the session is stale. A failed write does not
    /// advance the committed number.
    pub(crate) fn commit<E>(
        &self,
        session: SessionId,
        write: impl FnOnce() -> Result<(), E>,
    ) -> Option<Result<(), E>> {
        let mut committed = self
            .committed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if session.0 < *committed {
            return None;
        }

        let result = write();
        if result.is_ok() {
            *committed = session.0;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_numbers_increase() {
        let ledger = SessionLedger::default();
        let first = ledger.begin();
        let second = ledger.begin();
        assert!(second > first);
        assert_eq!(first.get(), 1);
    }

    #[test]
    fn ledger_rejects_stale_writer() {
        let ledger = SessionLedger::default();
        let old = ledger.begin();
        let new = ledger.begin();

        assert_eq!(ledger.commit::<()>(new, || Ok(())), Some(Ok(())));

        let mut wrote = false;
        assert_eq!(
            ledger.commit::<()>(old, || {
                wrote = true;
                Ok(())
            }),
            None
        );
        assert!(!wrote);
    }

    #[test]
    fn ledger_lets_older_session_commit_first() {
        let ledger = SessionLedger::default();
        let old = ledger.begin();
        let new = ledger.begin();

        assert!(ledger.commit::<()>(old, || Ok(())).is_some());
        assert!(ledger.commit::<()>(new, || Ok(())).is_some());
    }

    #[test]
    fn failed_write_does_not_block_older_sessions() {
        let ledger = SessionLedger::default();
        let old = ledger.begin();
        let new = ledger.begin();

        assert_eq!(ledger.commit(new, || Err("disk full")), Some(Err("disk full")));
        assert!(ledger.commit::<&str>(old, || Ok(())).is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn finished_session_yields_nothing() {
        let (sender, receiver) = mpsc::channel::<SyncItem<u8>>(1);
        drop(sender);

        let session = SyncSession::new(SessionId(1), receiver, None);
        assert_eq!(session.collect_latest().await.unwrap(), None);
    }
}
