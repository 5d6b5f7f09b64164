//! kickoff-core - Core library for Kickoff
//!
//! This crate contains the event models, the local `SQLite` record store, the
//! HTTP client for the events API and the synchronizer that reconciles the
//! two. Interfaces (currently the CLI) consume snapshots from
//! [`EventSynchronizer`] sessions.

pub mod config;
pub mod connectivity;
pub mod db;
pub mod error;
pub mod models;
pub mod observer;
pub mod remote;
pub mod sync;
mod util;

pub use config::{ClientConfig, ConfigError};
pub use error::{Error, Result};
pub use models::{Event, EventId, TournamentId};
pub use sync::{EventSynchronizer, LatestSnapshot, Snapshot, SnapshotSource, SyncError, SyncSession};
