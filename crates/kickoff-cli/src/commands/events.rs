use kickoff_core::db::EventStore;
use kickoff_core::EventId;

use crate::commands::common::{
    build_synchronizer, event_to_list_item, format_event_line, open_store, print_session,
    CommandContext,
};
use crate::error::CliError;

pub async fn run_events(ids: Vec<EventId>, context: &CommandContext) -> Result<(), CliError> {
    let store = open_store(&context.db_path)?;
    let ids = if ids.is_empty() {
        store.all_event_ids()?
    } else {
        ids
    };

    if ids.is_empty() {
        if !context.json {
            println!("No event ids given or cached. Run `kickoff ids` first.");
        }
        return Ok(());
    }

    let sync = build_synchronizer(context, store)?;
    print_session(
        sync.synchronize_events(ids),
        context.json,
        event_to_list_item,
        format_event_line,
    )
    .await
}
