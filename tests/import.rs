use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use boxscore_ingest::report::{box_score, player_report, team_report, GameResult};
use boxscore_ingest::season::Ruleset;
use boxscore_ingest::store::models::{Player, RowId};
use boxscore_ingest::store::queries;
use boxscore_ingest::{
    import_batch, import_file, import_paths, ImportError, ImportOptions, ImportOutcome, Store,
};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture(name: &str) -> Vec<u8> {
    fs::read(fixture_path(name)).unwrap()
}

fn new_store() -> (Store, RowId) {
    let store = Store::open_in_memory().unwrap();
    let season = store.create_season("Spring 2025", Ruleset::NcaaSoftball).unwrap();
    (store, season.id)
}

fn import(store: &mut Store, season: RowId, name: &str) -> ImportOutcome {
    import_file(store, &fixture(name), season, &ImportOptions::default()).unwrap()
}

fn find_player(store: &Store, team_code: &str, season: RowId, name: &str) -> Player {
    let team = queries::team_by_code(store.conn(), team_code, season)
        .unwrap()
        .unwrap();
    queries::players_on_team(store.conn(), team.id)
        .unwrap()
        .into_iter()
        .find(|p| p.name == name)
        .unwrap()
}

#[test]
fn opener_is_stored_in_full() {
    let (mut store, season) = new_store();
    let outcome = import(&mut store, season, "opener.xml");
    assert!(outcome.is_created());

    let counts = store.counts().unwrap();
    assert_eq!(counts.teams, 2);
    assert_eq!(counts.players, 7);
    assert_eq!(counts.games, 1);
    assert_eq!(counts.batting, 5);
    assert_eq!(counts.pitching, 3);
    assert_eq!(counts.fielding, 4);
    assert_eq!(counts.inning_scores, 7);
    assert_eq!(counts.plays, 4);

    let game = outcome.game();
    assert_eq!(game.attendance, 212);
    assert_eq!((game.visitor.runs, game.home.runs), (3, 2));
    assert!(game.is_complete);
}

#[test]
fn importing_twice_changes_nothing() {
    let (mut store, season) = new_store();
    let first = import(&mut store, season, "opener.xml");
    let before = store.counts().unwrap();

    let second = import(&mut store, season, "opener.xml");
    assert!(matches!(second, ImportOutcome::AlreadyImported(_)));
    assert_eq!(second.game().id, first.game().id);
    assert_eq!(store.counts().unwrap(), before);
}

#[test]
fn restated_file_does_not_overwrite_stored_lines() {
    let (mut store, season) = new_store();
    let first = import(&mut store, season, "opener.xml");
    let before = store.counts().unwrap();

    let restated = String::from_utf8(fixture("opener.xml"))
        .unwrap()
        .replace(
            r#"<hitting ab="3" r="1" h="3" double="1" rbi="1"/>"#,
            r#"<hitting ab="5" r="0" h="0" rbi="0"/>"#,
        )
        .replace("J. Smith singled to right field.", "J. Smith struck out.");
    let second = import_file(&mut store, restated.as_bytes(), season, &ImportOptions::default())
        .unwrap();
    assert!(matches!(second, ImportOutcome::AlreadyImported(_)));
    assert_eq!(second.game().id, first.game().id);
    assert_eq!(store.counts().unwrap(), before);

    let smith = find_player(&store, "RIV", season, "Smith, Jo");
    let lines = queries::batting_for_player(store.conn(), smith.id).unwrap();
    assert_eq!((lines[0].stats.at_bats, lines[0].stats.hits), (3, 3));
    let plays = queries::plays(store.conn(), first.game().id).unwrap();
    assert!(plays.iter().any(|p| p.narrative == "J. Smith singled to right field."));
}

#[test]
fn player_listed_twice_is_invalid_and_writes_nothing() {
    let (mut store, season) = new_store();
    let second_smith = r#"<player name="Smith, Jo" uni="7" gp="1"><hitting ab="1"/></player>
    <player name="Lee, Kim""#;
    let doubled = String::from_utf8(fixture("opener.xml"))
        .unwrap()
        .replacen(r#"<player name="Lee, Kim""#, second_smith, 1);
    let files = vec![
        (String::from("doubled"), doubled.into_bytes()),
        (String::from("rematch"), fixture("rematch.xml")),
    ];
    let report = import_batch(&mut store, files, season, &ImportOptions::default()).unwrap();
    let statuses = report.files.iter().map(|f| f.status()).collect::<Vec<_>>();
    assert_eq!(statuses, vec!["invalid", "created"]);
    assert_eq!(store.counts().unwrap().games, 1);
}

#[test]
fn teams_and_players_are_shared_across_games() {
    let (mut store, season) = new_store();
    import(&mut store, season, "opener.xml");
    import(&mut store, season, "rematch.xml");
    import(&mut store, season, "road_trip.xml");

    let counts = store.counts().unwrap();
    assert_eq!(counts.teams, 3);
    assert_eq!(counts.players, 7);
    assert_eq!(counts.games, 3);
    assert_eq!(counts.batting, 8);

    let smith = find_player(&store, "RIV", season, "Smith, Jo");
    let report = player_report(store.conn(), smith.id).unwrap().unwrap();
    assert_eq!(report.batting.games, 3);
    assert_eq!(report.batting.totals.at_bats, 10);
    assert_eq!(report.batting.avg.to_string(), "0.500");
    assert_eq!(report.game_log.len(), 3);
}

#[test]
fn external_id_is_filled_once_and_kept() {
    let (mut store, season) = new_store();
    import(&mut store, season, "opener.xml");
    assert_eq!(find_player(&store, "RIV", season, "Smith, Jo").external_id, None);

    import(&mut store, season, "rematch.xml");
    let smith = find_player(&store, "RIV", season, "Smith, Jo");
    assert_eq!(smith.external_id.as_deref(), Some("jsmith-2025"));

    import(&mut store, season, "road_trip.xml");
    let again = find_player(&store, "RIV", season, "Smith, Jo");
    assert_eq!(again.id, smith.id);
    assert_eq!(again.external_id.as_deref(), Some("jsmith-2025"));
}

#[test]
fn innings_pitched_add_across_games() {
    let (mut store, season) = new_store();
    import(&mut store, season, "opener.xml");
    import(&mut store, season, "rematch.xml");

    let park = find_player(&store, "RIV", season, "Park, Dana");
    let report = player_report(store.conn(), park.id).unwrap().unwrap();
    assert_eq!(report.pitching.innings_pitched.to_string(), "10.2");
    assert_eq!(report.pitching.earned_runs, 4);
    assert_eq!(report.pitching.wins, 2);
    assert_eq!(report.pitching.games, 2);
    assert_eq!(report.fielding.fpct.to_string(), "1.000");
}

#[test]
fn malformed_file_does_not_disturb_its_batch() {
    let (mut store, season) = new_store();
    let files = ["opener.xml", "truncated.xml", "rematch.xml", "road_trip.xml"]
        .iter()
        .map(|name| fixture_path(name))
        .collect::<Vec<_>>();
    let report = import_paths(&mut store, &files, season, &ImportOptions::default()).unwrap();

    assert_eq!(report.created(), 3);
    assert_eq!(report.failed(), 1);
    let failure = report.files.iter().find(|f| f.result.is_err()).unwrap();
    assert!(failure.name.ends_with("truncated.xml"));
    assert!(matches!(&failure.result, Err(e) if e.is_validation()));
    assert_eq!(store.counts().unwrap().games, 3);
}

#[test]
fn batch_of_buffers_reports_duplicates_as_skipped() {
    let (mut store, season) = new_store();
    let files = vec![
        (String::from("first"), fixture("opener.xml")),
        (String::from("copy"), fixture("opener.xml")),
        (String::from("broken"), fixture("truncated.xml")),
    ];
    let report = import_batch(&mut store, files, season, &ImportOptions::default()).unwrap();
    assert_eq!((report.created(), report.skipped(), report.failed()), (1, 1, 1));
}

#[test]
fn latin1_file_is_imported() {
    let (mut store, season) = new_store();
    let outcome = import(&mut store, season, "latin1.xml");
    assert_eq!(outcome.game().stadium, "Estadio Pe\u{f1}a");
    let pena = find_player(&store, "SAN", season, "Pe\u{f1}a, Luis");
    assert_eq!(pena.uniform_number, "5");
}

#[test]
fn team_report_schedule_and_box_score() {
    let (mut store, season) = new_store();
    import(&mut store, season, "opener.xml");
    import(&mut store, season, "rematch.xml");
    let road = import(&mut store, season, "road_trip.xml");

    let riv = queries::team_by_code(store.conn(), "RIV", season).unwrap().unwrap();
    let report = team_report(store.conn(), riv.id).unwrap().unwrap();
    let results = report
        .schedule
        .iter()
        .map(|e| (e.result, e.score.as_str(), e.opponent.code.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        results,
        vec![
            (GameResult::Win, "3-2", "HIL"),
            (GameResult::Win, "4-1", "HIL"),
            (GameResult::Loss, "0-5", "LAK"),
        ]
    );
    assert_eq!(report.batting_leaders[0].player.name, "Park, Dana");

    let view = box_score(store.conn(), road.game().id).unwrap().unwrap();
    assert_eq!(view.slug, "03152025_VIS_HOM_1");
    assert_eq!(view.innings.len(), 1);
    assert_eq!(view.innings[0].home_score, "5");
}

#[test]
fn unknown_season_is_refused() {
    let (mut store, _) = new_store();
    let err = import_file(&mut store, &fixture("opener.xml"), 404, &ImportOptions::default())
        .unwrap_err();
    assert!(matches!(err, ImportError::Storage(_)));
    assert_eq!(store.counts().unwrap().teams, 0);
}

#[test]
fn concurrent_imports_store_one_game() {
    let mut path = std::env::temp_dir();
    path.push(format!("boxscore_race_{}.db", std::process::id()));
    let _ = fs::remove_file(&path);

    let season = Store::open(&path)
        .unwrap()
        .create_season("Race", Ruleset::Mlb)
        .unwrap()
        .id;
    let bytes = fixture("opener.xml");

    let handles = (0..4)
        .map(|_| {
            let path = path.clone();
            let bytes = bytes.clone();
            thread::spawn(move || {
                let mut store = Store::open(&path).unwrap();
                import_file(&mut store, &bytes, season, &ImportOptions::default()).unwrap()
            })
        })
        .collect::<Vec<_>>();
    let outcomes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect::<Vec<_>>();

    assert_eq!(outcomes.iter().filter(|o| o.is_created()).count(), 1);
    let ids = outcomes.iter().map(|o| o.game().id).collect::<Vec<_>>();
    assert!(ids.windows(2).all(|w| w[0] == w[1]));

    let counts = Store::open(&path).unwrap().counts().unwrap();
    assert_eq!(counts.games, 1);
    assert_eq!(counts.batting, 5);
    assert_eq!(counts.teams, 2);
    let _ = fs::remove_file(&path);
}
