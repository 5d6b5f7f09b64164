use kickoff_core::db::EventStore;

use crate::commands::common::{open_store, print_events, CommandContext};
use crate::error::CliError;

pub fn run_list(favourites: bool, context: &CommandContext) -> Result<(), CliError> {
    let store = open_store(&context.db_path)?;
    let events = if favourites {
        store.favourite_events()?
    } else {
        store.all_events()?
    };

    print_events(&events, context.json)
}
