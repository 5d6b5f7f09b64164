//! Publish/subscribe bus for network request outcomes

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::remote::RemoteError;

const DEFAULT_CAPACITY: usize = 64;

/// Notable request outcomes
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    /// A request failed after all retries
    RequestFailed {
        request_id: Uuid,
        path: String,
        error: RemoteError,
    },
    /// A request failed once and is being retried
    RequestRetried { request_id: Uuid, path: String },
}

/// Broadcasts [`NetworkEvent`]s to any number of subscribers
#[derive(Debug, Clone)]
pub struct NetworkObserver {
    sender: broadcast::Sender<NetworkEvent>,
}

impl NetworkObserver {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event
    pub fn publish(&self, event: NetworkEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NetworkObserver {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Handle for one subscriber; dropping it also unsubscribes
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<NetworkEvent>,
}

impl Subscription {
    /// Wait for the next event
    ///
    /// Returns `None` once the observer is gone. Events missed because this
    /// subscriber lagged behind are skipped.
    pub async fn recv(&mut self) -> Option<NetworkEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Network observer subscriber lagged, skipped {skipped} events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next event if one is already queued
    pub fn try_recv(&mut self) -> Option<NetworkEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(_) => return None,
            }
        }
    }

    /// Stop receiving events
    pub fn unsubscribe(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(path: &str) -> NetworkEvent {
        NetworkEvent::RequestFailed {
            request_id: Uuid::new_v4(),
            path: path.to_string(),
            error: RemoteError::Unknown("boom".to_string()),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn subscribers_receive_published_events() {
        let observer = NetworkObserver::default();
        let mut first = observer.subscribe();
        let mut second = observer.subscribe();

        observer.publish(failure("event/1/details"));

        for subscription in [&mut first, &mut second] {
            match subscription.recv().await {
                Some(NetworkEvent::RequestFailed { path, .. }) => {
                    assert_eq!(path, "event/1/details");
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[test]
    fn unsubscribe_detaches_handle() {
        let observer = NetworkObserver::default();
        let subscription = observer.subscribe();
        assert_eq!(observer.subscriber_count(), 1);

        subscription.unsubscribe();
        assert_eq!(observer.subscriber_count(), 0);

        // Publishing without subscribers must not panic
        observer.publish(failure("x"));
    }

    #[test]
    fn try_recv_is_empty_without_events() {
        let observer = NetworkObserver::default();
        let mut subscription = observer.subscribe();
        assert!(subscription.try_recv().is_none());

        observer.publish(NetworkEvent::RequestRetried {
            request_id: Uuid::new_v4(),
            path: "p".to_string(),
        });
        assert!(matches!(
            subscription.try_recv(),
            Some(NetworkEvent::RequestRetried { .. })
        ));
    }
}
