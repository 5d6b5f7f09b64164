use kickoff_core::db::EventStore;
use kickoff_core::EventId;

use crate::commands::common::{open_store, CommandContext};
use crate::error::CliError;

pub fn run_set_favourite(
    id: EventId,
    favourite: bool,
    context: &CommandContext,
) -> Result<(), CliError> {
    let store = open_store(&context.db_path)?;
    match store.set_favourite(id, favourite) {
        Ok(()) => {
            println!("{id}");
            Ok(())
        }
        Err(kickoff_core::Error::NotFound(_)) => Err(CliError::EventNotCached(id)),
        Err(error) => Err(error.into()),
    }
}
