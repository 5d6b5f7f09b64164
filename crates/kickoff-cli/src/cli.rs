use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kickoff_core::{EventId, TournamentId};

#[derive(Parser)]
#[command(name = "kickoff")]
#[command(about = "Follow a tournament's matches from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Use cached data only, never contact the events API
    #[arg(long, global = true)]
    pub offline: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Synchronize the tournament's current event ids
    Ids {
        /// Tournament id (defaults to KICKOFF_TOURNAMENT_ID)
        #[arg(long, value_name = "ID")]
        tournament: Option<TournamentId>,
    },
    /// Synchronize event details
    Events {
        /// Event ids (defaults to the cached id list)
        ids: Vec<EventId>,
    },
    /// Refresh event ids, then the details of every current event
    Refresh {
        /// Tournament id (defaults to KICKOFF_TOURNAMENT_ID)
        #[arg(long, value_name = "ID")]
        tournament: Option<TournamentId>,
    },
    /// List cached events
    List {
        /// Only show favourite events
        #[arg(long)]
        favourites: bool,
    },
    /// Mark a cached event as favourite
    Favourite {
        /// Event id
        id: EventId,
    },
    /// Remove the favourite mark from a cached event
    Unfavourite {
        /// Event id
        id: EventId,
    },
}
