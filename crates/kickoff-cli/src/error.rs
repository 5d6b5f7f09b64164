use kickoff_core::{ConfigError, EventId, SyncError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] kickoff_core::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Event {0} is not cached. Run `kickoff refresh` first.")]
    EventNotCached(EventId),
}
