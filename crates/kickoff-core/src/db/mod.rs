//! Local record store for Kickoff

mod connection;
mod migrations;
mod store;

pub use connection::Database;
pub use store::{EventStore, SqliteEventStore};
