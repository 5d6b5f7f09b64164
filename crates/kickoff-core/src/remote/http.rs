//! HTTP client for the events API

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use super::response::{decode_event_details, decode_event_ids};
use super::{retry_once, RemoteError, RemoteEventSource, RemoteResult};
use crate::connectivity::Connectivity;
use crate::error::{Error, Result};
use crate::models::{Event, EventId, TournamentId};
use crate::observer::{NetworkEvent, NetworkObserver};
use crate::util::{compact_text, normalize_text_option, parse_http_url};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Connection settings for [`HttpEventSource`]
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

/// [`RemoteEventSource`] backed by the public events API
#[derive(Clone)]
pub struct HttpEventSource {
    base_url: String,
    client: reqwest::Client,
    connectivity: Arc<dyn Connectivity>,
    observer: NetworkObserver,
}

impl HttpEventSource {
    pub fn new(
        config: HttpSourceConfig,
        connectivity: Arc<dyn Connectivity>,
        observer: NetworkObserver,
    ) -> Result<Self> {
        let base_url = normalize_base_url(config.base_url)?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|error| Error::InvalidInput(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            base_url,
            client,
            connectivity,
            observer,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` relative to the base URL and return the body text
    async fn get(&self, path: &str) -> RemoteResult<String> {
        let connectivity = Arc::clone(&self.connectivity);
        let online = tokio::task::spawn_blocking(move || connectivity.is_online())
            .await
            .unwrap_or(false);
        if !online {
            return Err(RemoteError::NoConnectivity);
        }

        let request_id = Uuid::new_v4();
        let url = format!("{}/{}", self.base_url, path);
        let url = url.as_str();

        let result = retry_once(
            move || self.send(url, request_id),
            |error| {
                tracing::debug!("Retrying GET {path} ({request_id}) after: {error}");
                self.observer.publish(NetworkEvent::RequestRetried {
                    request_id,
                    path: path.to_string(),
                });
            },
        )
        .await;

        if let Err(error) = &result {
            tracing::warn!("GET {path} ({request_id}) failed: {error}");
            self.observer.publish(NetworkEvent::RequestFailed {
                request_id,
                path: path.to_string(),
                error: error.clone(),
            });
        }
        result
    }

    async fn send(&self, url: &str, request_id: Uuid) -> RemoteResult<String> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .send()
            .await
            .map_err(|error| RemoteError::Unknown(format!("request failed: {error}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| RemoteError::Unknown(format!("failed to read response body: {error}")))?;

        if !status.is_success() {
            return Err(RemoteError::Status {
                code: status.as_u16(),
                message: parse_api_error(status, &body),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl RemoteEventSource for HttpEventSource {
    async fn list_event_ids(&self, tournament: &TournamentId) -> RemoteResult<Vec<EventId>> {
        let body = self
            .get(&format!("unique-tournament/{tournament}/current-event-ids"))
            .await?;
        decode_event_ids(&body)
    }

    async fn fetch_event(&self, id: EventId) -> RemoteResult<Event> {
        let body = self.get(&format!("event/{id}/details")).await?;
        let mut events = decode_event_details(&body)?;

        if events.is_empty() {
            return Err(RemoteError::Unknown(format!(
                "details for event {id} contained no events"
            )));
        }

        // The details payload may list sibling events; prefer the one asked for
        let position = events.iter().position(|event| event.id == id).unwrap_or(0);
        Ok(events.swap_remove(position))
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return message.trim().to_string();
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        trimmed
    }
}

fn normalize_base_url(raw: String) -> Result<String> {
    let base_url = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::InvalidInput("API base URL must not be empty".to_string()))?;
    if parse_http_url(&base_url).is_some() {
        Ok(base_url.trim_end_matches('/').to_string())
    } else {
        Err(Error::InvalidInput(
            "API base URL must be an http:// or https:// URL with a host".to_string(),
        ))
    }
}
