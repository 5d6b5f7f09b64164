use kickoff_core::TournamentId;

use crate::commands::common::{build_synchronizer, open_store, print_session, CommandContext};
use crate::error::CliError;

pub async fn run_ids(
    tournament: Option<TournamentId>,
    context: &CommandContext,
) -> Result<(), CliError> {
    let tournament = tournament.unwrap_or_else(|| context.config.tournament_id.clone());
    let store = open_store(&context.db_path)?;
    let sync = build_synchronizer(context, store)?;

    print_session(
        sync.synchronize_event_ids(tournament),
        context.json,
        |id| id.get(),
        ToString::to_string,
    )
    .await
}
