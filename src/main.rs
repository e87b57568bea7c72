#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::cargo)]
#![warn(
    clippy::nursery,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::module_name_repetitions)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glob::GlobError;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use boxscore_ingest::report::{box_score, player_report, team_report, Leader, TeamReport};
use boxscore_ingest::season::{Gender, PlayEntryMode, Ruleset};
use boxscore_ingest::stats::BattingSummary;
use boxscore_ingest::store::models::RowId;
use boxscore_ingest::util::FlagCoercion;
use boxscore_ingest::{import_paths, FileReport, ImportOptions, Store};

const ABOUT: &str = "Imports box-score game files and reports season statistics.";

#[derive(Parser, Debug)]
#[command(name = "boxscore", about = ABOUT)]
struct Opt {
    #[arg(short, long, env = "BOXSCORE_DATABASE", default_value = "boxscore.db")]
    database: PathBuf,

    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or list seasons
    #[command(subcommand)]
    Season(SeasonCommand),
    /// Import game files matching the given glob patterns into a season
    Import {
        #[arg(short, long)]
        season: RowId,
        #[arg(long, default_value = "textual")]
        flag_coercion: FlagCoercion,
        #[arg(long)]
        max_file_bytes: Option<usize>,
        #[arg(required = true)]
        patterns: Vec<String>,
    },
    /// Season totals and game log for a player
    Player { id: RowId },
    /// Schedule and leaders for a team
    Team {
        id: RowId,
        /// Also write the batting leaders to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Box score for a game
    Game { id: RowId },
}

#[derive(Subcommand, Debug)]
enum SeasonCommand {
    Create {
        name: String,
        #[arg(long, default_value = "rules_hs_sb")]
        rules: Ruleset,
        #[arg(long, default_value = "female")]
        gender: Gender,
        #[arg(long, default_value = "box_game_totals")]
        entry_mode: PlayEntryMode,
    },
    List,
}

#[derive(Serialize)]
struct ImportRow<'a> {
    file: &'a str,
    status: &'static str,
    game_id: Option<RowId>,
    error: Option<String>,
}

impl<'a> From<&'a FileReport> for ImportRow<'a> {
    fn from(report: &'a FileReport) -> Self {
        Self {
            file: &report.name,
            status: report.status(),
            game_id: report.result.as_ref().ok().map(|o| o.game().id),
            error: report.result.as_ref().err().map(ToString::to_string),
        }
    }
}

/// One CSV row per batting leader.
#[derive(Serialize)]
struct BattingRow<'a> {
    name: &'a str,
    uniform_number: &'a str,
    games: u32,
    ab: u32,
    r: u32,
    h: u32,
    doubles: u32,
    triples: u32,
    hr: u32,
    rbi: u32,
    bb: u32,
    so: u32,
    sb: u32,
    avg: String,
    obp: String,
    slg: String,
    ops: String,
}

impl<'a> From<&'a Leader<BattingSummary>> for BattingRow<'a> {
    fn from(leader: &'a Leader<BattingSummary>) -> Self {
        let s = &leader.stats;
        Self {
            name: &leader.player.name,
            uniform_number: &leader.player.uniform_number,
            games: s.games,
            ab: s.totals.at_bats,
            r: s.totals.runs,
            h: s.totals.hits,
            doubles: s.totals.doubles,
            triples: s.totals.triples,
            hr: s.totals.home_runs,
            rbi: s.totals.rbi,
            bb: s.totals.walks,
            so: s.totals.strikeouts,
            sb: s.totals.stolen_bases,
            avg: s.avg.to_string(),
            obp: s.obp.to_string(),
            slg: s.slg.to_string(),
            ops: s.ops.to_string(),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = patterns
        .iter()
        .map(|p| glob::glob(p).with_context(|| format!("Bad file pattern {p}")))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect::<Result<Vec<PathBuf>, GlobError>>()?;
    files.par_sort();
    files.dedup();
    Ok(files)
}

fn write_leaders_csv(report: &TeamReport, path: &Path) -> Result<()> {
    let mut w = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for leader in &report.batting_leaders {
        w.serialize(BattingRow::from(leader))?;
    }
    w.flush()?;
    info!("Wrote {} batting rows to {}", report.batting_leaders.len(), path.display());
    Ok(())
}

fn run(opt: Opt) -> Result<()> {
    let mut store = Store::open(&opt.database)?;
    match opt.command {
        Command::Season(SeasonCommand::Create {
            name,
            rules,
            gender,
            entry_mode,
        }) => {
            if name.trim().is_empty() {
                bail!("Season name is required")
            }
            let season = store.create_season_with(&name, rules, gender, entry_mode)?;
            print_json(&season)
        }
        Command::Season(SeasonCommand::List) => print_json(&store.seasons()?),
        Command::Import {
            season,
            flag_coercion,
            max_file_bytes,
            patterns,
        } => {
            let files = expand_patterns(&patterns)?;
            info!("Importing {} files into season #{}", files.len(), season);
            let mut options = ImportOptions {
                flag_coercion,
                ..ImportOptions::default()
            };
            if let Some(max) = max_file_bytes {
                options.max_file_bytes = max;
            }
            let report = import_paths(&mut store, &files, season, &options)?;
            print_json(&report.files.iter().map(ImportRow::from).collect::<Vec<_>>())?;
            if report.failed() > 0 {
                bail!("{} of {} files failed", report.failed(), report.files.len())
            }
            Ok(())
        }
        Command::Player { id } => {
            let report = player_report(store.conn(), id)?.with_context(|| format!("No player #{id}"))?;
            print_json(&report)
        }
        Command::Team { id, csv } => {
            let report = team_report(store.conn(), id)?.with_context(|| format!("No team #{id}"))?;
            if let Some(path) = csv {
                write_leaders_csv(&report, &path)?;
            }
            print_json(&report)
        }
        Command::Game { id } => {
            let report = box_score(store.conn(), id)?.with_context(|| format!("No game #{id}"))?;
            print_json(&report)
        }
    }
}

#[allow(clippy::expect_used)]
fn main() {
    let opt: Opt = Opt::parse();
    let level = if opt.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to initialize trace");

    let start = Instant::now();
    run(opt).expect("Error occurred while running command");

    let end = start.elapsed();
    info!("Elapsed: {:?}", end);
}
