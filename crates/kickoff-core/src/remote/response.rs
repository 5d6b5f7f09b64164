//! Wire formats of the events API

use chrono::DateTime;
use serde::Deserialize;

use super::{RemoteError, RemoteResult};
use crate::models::{Event, EventId};

/// Decode `GET unique-tournament/{id}/current-event-ids`
pub fn decode_event_ids(body: &str) -> RemoteResult<Vec<EventId>> {
    serde_json::from_str(body)
        .map_err(|error| RemoteError::Unknown(format!("invalid event id list: {error}")))
}

/// Decode `GET event/{id}/details` into flat events
///
/// The payload nests events under `game.tournaments[]`; each event inherits
/// its tournament's name.
pub fn decode_event_details(body: &str) -> RemoteResult<Vec<Event>> {
    let response: EventDetailsResponse = serde_json::from_str(body)
        .map_err(|error| RemoteError::Unknown(format!("invalid event details: {error}")))?;

    let mut events = Vec::new();
    for tournament in response.game.tournaments {
        for event in tournament.events {
            let start_time = DateTime::from_timestamp(event.start_timestamp, 0).ok_or_else(|| {
                RemoteError::Unknown(format!(
                    "event {} has out-of-range startTimestamp {}",
                    event.id, event.start_timestamp
                ))
            })?;

            events.push(Event {
                id: EventId::new(event.id),
                tournament_name: tournament.tournament.name.clone(),
                home_team: event.home_team.name,
                away_team: event.away_team.name,
                home_score: event.home_score.and_then(|score| score.current),
                away_score: event.away_score.and_then(|score| score.current),
                start_time,
                favourite: false,
            });
        }
    }
    Ok(events)
}

#[derive(Debug, Deserialize)]
struct EventDetailsResponse {
    game: Game,
}

#[derive(Debug, Deserialize)]
struct Game {
    #[serde(default)]
    tournaments: Vec<TournamentPayload>,
}

#[derive(Debug, Deserialize)]
struct TournamentPayload {
    tournament: TournamentDetails,
    #[serde(default)]
    events: Vec<EventPayload>,
}

#[derive(Debug, Deserialize)]
struct TournamentDetails {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventPayload {
    id: i64,
    start_timestamp: i64,
    home_team: TeamPayload,
    away_team: TeamPayload,
    #[serde(default)]
    home_score: Option<ScorePayload>,
    #[serde(default)]
    away_score: Option<ScorePayload>,
}

#[derive(Debug, Deserialize)]
struct TeamPayload {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ScorePayload {
    #[serde(default)]
    current: Option<i32>,
}
