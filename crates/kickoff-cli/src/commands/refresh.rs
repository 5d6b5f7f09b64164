use futures::StreamExt;
use kickoff_core::{Event, LatestSnapshot, TournamentId};

use crate::commands::common::{build_synchronizer, open_store, print_events, CommandContext};
use crate::error::CliError;

/// Refresh the id list, then the details of every id in the final list
///
/// A failed id refresh falls back to the cached ids, so stale details are
/// still refreshed where possible.
pub async fn run_refresh(
    tournament: Option<TournamentId>,
    context: &CommandContext,
) -> Result<(), CliError> {
    let tournament = tournament.unwrap_or_else(|| context.config.tournament_id.clone());
    let store = open_store(&context.db_path)?;
    let sync = build_synchronizer(context, store)?;

    let mut ids = LatestSnapshot::new();
    let mut id_sessions = sync.synchronize_event_ids(tournament);
    while let Some(item) = id_sessions.next().await {
        match item {
            Ok(snapshot) => {
                ids.apply(snapshot);
            }
            Err(error) => eprintln!("Warning: keeping cached event ids: {error}"),
        }
    }

    let ids = ids.items().to_vec();
    if ids.is_empty() {
        return print_events(&[], context.json);
    }

    let mut events = LatestSnapshot::<Event>::new();
    let mut event_sessions = sync.synchronize_events(ids);
    let mut failure = None;
    while let Some(item) = event_sessions.next().await {
        match item {
            Ok(snapshot) => {
                for warning in &snapshot.warnings {
                    eprintln!("Warning: {warning}");
                }
                events.apply(snapshot);
            }
            Err(error) => failure = Some(error),
        }
    }

    print_events(events.items(), context.json)?;
    match failure {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}
