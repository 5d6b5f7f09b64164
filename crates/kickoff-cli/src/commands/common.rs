use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::StreamExt;
use kickoff_core::connectivity::{Connectivity, ManualConnectivity, ProbeConnectivity};
use kickoff_core::db::{Database, EventStore, SqliteEventStore};
use kickoff_core::observer::{NetworkEvent, NetworkObserver, Subscription};
use kickoff_core::remote::HttpEventSource;
use kickoff_core::{ClientConfig, Event, EventSynchronizer, Snapshot, SnapshotSource, SyncSession};
use serde::Serialize;

use crate::error::CliError;

/// Settings shared by every subcommand
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: ClientConfig,
    pub db_path: PathBuf,
    pub offline: bool,
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct EventListItem {
    pub id: i64,
    pub tournament: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub start_time: String,
    pub favourite: bool,
}

#[derive(Debug, Serialize)]
pub struct SnapshotItem<T> {
    pub session: u64,
    pub source: SnapshotSource,
    pub items: Vec<T>,
    pub warnings: Vec<String>,
}

pub fn open_store(db_path: &Path) -> Result<Arc<SqliteEventStore>, CliError> {
    let db = Database::open(db_path)?;
    Ok(Arc::new(SqliteEventStore::new(db)))
}

/// Wire the store, the HTTP source and connectivity into a synchronizer
pub fn build_synchronizer(
    context: &CommandContext,
    store: Arc<dyn EventStore>,
) -> Result<EventSynchronizer, CliError> {
    let connectivity: Arc<dyn Connectivity> = if context.offline {
        Arc::new(ManualConnectivity::new(false))
    } else {
        Arc::new(ProbeConnectivity::for_url(
            &context.config.api_base_url,
            context.config.probe_timeout,
        )?)
    };

    let observer = NetworkObserver::default();
    spawn_network_log(observer.subscribe());

    let remote = HttpEventSource::new(
        context.config.http_source(),
        Arc::clone(&connectivity),
        observer,
    )?;
    Ok(EventSynchronizer::new(store, Arc::new(remote), connectivity))
}

/// Log retried requests; failures surface through the session itself
fn spawn_network_log(mut subscription: Subscription) {
    tokio::spawn(async move {
        while let Some(event) = subscription.recv().await {
            if let NetworkEvent::RequestRetried { request_id, path } = event {
                tracing::debug!("Retried GET {path} ({request_id})");
            }
        }
    });
}

/// Print every snapshot of `session` as it arrives
pub async fn print_session<T, I>(
    mut session: SyncSession<T>,
    as_json: bool,
    to_item: impl Fn(&T) -> I,
    to_line: impl Fn(&T) -> String,
) -> Result<(), CliError>
where
    I: Serialize,
{
    let mut printed = false;
    while let Some(item) = session.next().await {
        let snapshot = item?;
        printed = true;
        if as_json {
            println!(
                "{}",
                serde_json::to_string(&snapshot_to_item(&snapshot, &to_item))?
            );
        } else {
            println!("{}", snapshot_header(&snapshot));
            for line in snapshot.items.iter().map(&to_line) {
                println!("  {line}");
            }
            for warning in &snapshot.warnings {
                println!("  warning: {warning}");
            }
        }
    }

    if !printed && !as_json {
        println!("Nothing cached yet and no fresh data available.");
    }
    Ok(())
}

pub fn snapshot_to_item<T, I>(snapshot: &Snapshot<T>, to_item: impl Fn(&T) -> I) -> SnapshotItem<I> {
    SnapshotItem {
        session: snapshot.session.get(),
        source: snapshot.source,
        items: snapshot.items.iter().map(to_item).collect(),
        warnings: snapshot.warnings.iter().map(ToString::to_string).collect(),
    }
}

pub fn snapshot_header<T>(snapshot: &Snapshot<T>) -> String {
    let source = match snapshot.source {
        SnapshotSource::Cache => "cached",
        SnapshotSource::Remote => "fresh",
    };
    format!(
        "Session {}: {} {source} record(s)",
        snapshot.session,
        snapshot.items.len()
    )
}

pub fn event_to_list_item(event: &Event) -> EventListItem {
    EventListItem {
        id: event.id.get(),
        tournament: event.tournament_name.clone(),
        home_team: event.home_team.clone(),
        away_team: event.away_team.clone(),
        home_score: event.home_score,
        away_score: event.away_score,
        start_time: event.start_time.to_rfc3339(),
        favourite: event.favourite,
    }
}

pub fn format_event_line(event: &Event) -> String {
    let marker = if event.favourite { " *" } else { "" };
    format!(
        "{}  {}  {}  [{}]{marker}",
        event.id,
        event.start_time.format("%Y-%m-%d %H:%M"),
        event.score_line(),
        event.tournament_name
    )
}

pub fn print_events(events: &[Event], as_json: bool) -> Result<(), CliError> {
    if as_json {
        let json_items = events
            .iter()
            .map(event_to_list_item)
            .collect::<Vec<EventListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("No events cached.");
        return Ok(());
    }

    for event in events {
        println!("{}", format_event_line(event));
    }
    Ok(())
}
