//! Data models for Kickoff

mod event;
mod tournament;

pub use event::{Event, EventId};
pub use tournament::{TournamentId, DEFAULT_TOURNAMENT_ID};

#[cfg(test)]
pub(crate) use event::sample_event;
