//! Kickoff CLI - follow a tournament's matches from the terminal
//!
//! Cached data is shown immediately; fresh data follows when the events API
//! is reachable.

mod cli;
mod commands;
mod error;

use std::path::PathBuf;

use clap::Parser;
use kickoff_core::ClientConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::common::CommandContext;
use crate::commands::events::run_events;
use crate::commands::favourite::run_set_favourite;
use crate::commands::ids::run_ids;
use crate::commands::list::run_list;
use crate::commands::refresh::run_refresh;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;
    let context = CommandContext {
        db_path: resolve_db_path(cli.db_path, config.database_path.clone()),
        config,
        offline: cli.offline,
        json: cli.json,
    };
    tracing::debug!("Using database at {}", context.db_path.display());

    match cli.command {
        Commands::Ids { tournament } => run_ids(tournament, &context).await,
        Commands::Events { ids } => run_events(ids, &context).await,
        Commands::Refresh { tournament } => run_refresh(tournament, &context).await,
        Commands::List { favourites } => run_list(favourites, &context),
        Commands::Favourite { id } => run_set_favourite(id, true, &context),
        Commands::Unfavourite { id } => run_set_favourite(id, false, &context),
    }
}

fn init_tracing() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "kickoff=info".parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_db_path(cli_db_path: Option<PathBuf>, env_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path.or(env_db_path).unwrap_or_else(default_db_path)
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kickoff")
        .join("kickoff.db")
}

#[cfg(test)]
mod tests;
