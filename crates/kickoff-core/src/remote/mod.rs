//! Remote event source: the authority for which events exist and their details

mod http;
mod response;

use std::future::Future;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Event, EventId, TournamentId};

pub use http::{HttpEventSource, HttpSourceConfig};
pub use response::{decode_event_details, decode_event_ids};

/// Failure of a single remote request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The device is offline; no request was attempted
    #[error("No internet connectivity")]
    NoConnectivity,

    /// The server answered with a non-success status
    #[error("Remote error {code}: {message}")]
    Status { code: u16, message: String },

    /// Transport failure or a response that could not be decoded
    #[error("Unknown remote error: {0}")]
    Unknown(String),
}

impl RemoteError {
    /// Whether a second attempt has a chance of succeeding
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::NoConnectivity => false,
            Self::Status { code, .. } => *code >= 500,
            Self::Unknown(_) => true,
        }
    }

    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Request/response access to the remote API
#[async_trait]
pub trait RemoteEventSource: Send + Sync {
    /// Identifiers of the tournament's current events
    async fn list_event_ids(&self, tournament: &TournamentId) -> RemoteResult<Vec<EventId>>;

    /// Full details of one event
    async fn fetch_event(&self, id: EventId) -> RemoteResult<Event>;
}

/// Run `attempt`, retrying once when the first failure is retryable
///
/// `on_retry` is called with the first error right before the second attempt.
pub async fn retry_once<T, F, Fut>(
    mut attempt: F,
    on_retry: impl FnOnce(&RemoteError),
) -> RemoteResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RemoteResult<T>>,
{
    match attempt().await {
        Err(error) if error.is_retryable() => {
            on_retry(&error);
            attempt().await
        }
        result => result,
    }
}
