use std::path::PathBuf;

use chrono::DateTime;
use clap::{CommandFactory, Parser};
use kickoff_core::db::EventStore;
use kickoff_core::{ClientConfig, Event, EventId, SnapshotSource, TournamentId};
use pretty_assertions::assert_eq;

use crate::cli::{Cli, Commands};
use crate::commands::common::{
    build_synchronizer, event_to_list_item, format_event_line, open_store, snapshot_header,
    snapshot_to_item, CommandContext,
};
use crate::commands::favourite::run_set_favourite;
use crate::error::CliError;
use crate::{default_db_path, resolve_db_path};

fn event(id: i64) -> Event {
    Event {
        id: EventId::new(id),
        tournament_name: "Premier League".to_string(),
        home_team: "Brentford".to_string(),
        away_team: "Burnley".to_string(),
        home_score: Some(3),
        away_score: Some(0),
        start_time: DateTime::from_timestamp(1_697_371_200, 0).unwrap(),
        favourite: false,
    }
}

fn offline_context(db_path: PathBuf) -> CommandContext {
    CommandContext {
        config: ClientConfig::default(),
        db_path,
        offline: true,
        json: false,
    }
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn parses_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["kickoff", "ids", "--tournament", "8", "--offline", "--json"])
        .unwrap();

    assert!(cli.offline);
    assert!(cli.json);
    match cli.command {
        Commands::Ids { tournament } => {
            assert_eq!(tournament, Some(TournamentId::new("8").unwrap()));
        }
        _ => panic!("expected ids command"),
    }
}

#[test]
fn parses_event_ids() {
    let cli = Cli::try_parse_from(["kickoff", "events", "11352391", "11352370"]).unwrap();
    match cli.command {
        Commands::Events { ids } => {
            assert_eq!(ids, vec![EventId::new(11_352_391), EventId::new(11_352_370)]);
        }
        _ => panic!("expected events command"),
    }

    assert!(Cli::try_parse_from(["kickoff", "favourite", "abc"]).is_err());
}

#[test]
fn resolve_db_path_prefers_flag_then_environment() {
    let flag = PathBuf::from("/tmp/flag.db");
    let env = PathBuf::from("/tmp/env.db");

    assert_eq!(resolve_db_path(Some(flag.clone()), Some(env.clone())), flag);
    assert_eq!(resolve_db_path(None, Some(env.clone())), env);
    assert_eq!(resolve_db_path(None, None), default_db_path());
    assert!(default_db_path().ends_with("kickoff/kickoff.db"));
}

#[test]
fn format_event_line_marks_favourites() {
    let line = format_event_line(&event(1).with_favourite(true));
    assert_eq!(
        line,
        "1  2023-10-15 12:00  Brentford 3 - 0 Burnley  [Premier League] *"
    );
    assert!(!format_event_line(&event(1)).ends_with('*'));
}

#[test]
fn event_list_item_serializes_scores_and_time() {
    let item = event_to_list_item(&event(11_352_391));
    let json = serde_json::to_value(&item).unwrap();

    assert_eq!(json["id"], 11_352_391);
    assert_eq!(json["home_score"], 3);
    assert_eq!(json["start_time"], "2023-10-15T12:00:00+00:00");
    assert_eq!(json["favourite"], false);
}

#[test]
fn favourite_requires_cached_event() {
    let dir = tempfile::tempdir().unwrap();
    let context = offline_context(dir.path().join("kickoff.db"));

    let err = run_set_favourite(EventId::new(5), true, &context).unwrap_err();
    assert!(matches!(err, CliError::EventNotCached(id) if id == EventId::new(5)));

    open_store(&context.db_path)
        .unwrap()
        .replace_events(&[event(5)])
        .unwrap();
    run_set_favourite(EventId::new(5), true, &context).unwrap();

    let store = open_store(&context.db_path).unwrap();
    assert_eq!(store.favourite_ids().unwrap(), vec![EventId::new(5)]);
}

#[tokio::test(flavor = "multi_thread")]
async fn offline_synchronizer_serves_cached_ids() {
    let dir = tempfile::tempdir().unwrap();
    let context = offline_context(dir.path().join("kickoff.db"));
    let store = open_store(&context.db_path).unwrap();
    store
        .replace_event_ids(&[EventId::new(1), EventId::new(2)])
        .unwrap();

    let sync = build_synchronizer(&context, store).unwrap();
    let snapshot = sync
        .synchronize_event_ids(TournamentId::default())
        .collect_latest()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(snapshot.source, SnapshotSource::Cache);
    assert_eq!(snapshot_header(&snapshot), "Session #1: 2 cached record(s)");

    let item = snapshot_to_item(&snapshot, |id| id.get());
    assert_eq!(
        serde_json::to_string(&item).unwrap(),
        r#"{"session":1,"source":"cache","items":[1,2],"warnings":[]}"#
    );
}
