use std::collections::BTreeMap;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::game_file::roster::{PlayerEntry, TeamEntry};
use crate::game_file::traits::{Matchup, Side};
use crate::game_file::GameFile;
use crate::store::entities::{resolve_player, resolve_team};
use crate::store::models::{Game, GameKey, RowId, Team, TeamTotals};

/// Result of handing a parsed game file to the store.
#[derive(Debug, Eq, PartialEq, Clone, Serialize)]
pub enum ImportOutcome {
    Created(Game),
    /// The game key was already stored. Nothing under the game was written.
    AlreadyImported(Game),
}

impl ImportOutcome {
    pub const fn game(&self) -> &Game {
        match self {
            Self::Created(g) | Self::AlreadyImported(g) => g,
        }
    }

    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

impl GameKey {
    pub fn for_file(file: &GameFile, teams: &Matchup<Team>) -> Self {
        Self {
            date: file.venue.date.clone(),
            visitor_team_id: teams.away.id,
            home_team_id: teams.home.id,
            start_time: file.venue.start_time.clone(),
            doubleheader: file.venue.doubleheader,
        }
    }
}

pub fn find_game(conn: &Connection, key: &GameKey) -> Result<Option<Game>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM games
             WHERE date = ?1 AND visitor_team_id = ?2 AND home_team_id = ?3
               AND start_time = ?4 AND doubleheader = ?5",
            Game::COLUMNS
        ),
        params![
            key.date,
            key.visitor_team_id,
            key.home_team_id,
            key.start_time,
            key.doubleheader
        ],
        Game::from_row,
    )
    .optional()
    .context("Failed to look up game by key")
}

/// Stores a parsed game and everything under it as one transaction.
///
/// If the game key is already present, either before we start or because another writer
/// inserted it first, the stored game is returned and no rows are added under it.
pub fn store_game(conn: &mut Connection, file: &GameFile, season_id: RowId) -> Result<ImportOutcome> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .context("Failed to open import transaction")?;

    let teams = Matchup::new(
        resolve_team(&tx, &file.teams.away, season_id)?,
        resolve_team(&tx, &file.teams.home, season_id)?,
    );
    let key = GameKey::for_file(file, &teams);

    if let Some(existing) = find_game(&tx, &key)? {
        warn!(
            "Game {} {} {} at {} is already stored as #{}, skipping",
            key.date, key.start_time, teams.away.code, teams.home.code, existing.id
        );
        tx.commit()?;
        return Ok(ImportOutcome::AlreadyImported(existing));
    }

    let Some(game_id) = insert_game(&tx, &key, file)? else {
        // Lost a race on the unique key: the other writer owns the children.
        let existing = find_game(&tx, &key)?.context("Game vanished after key conflict")?;
        warn!("Game #{} was inserted concurrently, skipping", existing.id);
        tx.commit()?;
        return Ok(ImportOutcome::AlreadyImported(existing));
    };

    insert_inning_scores(&tx, game_id, &file.teams)?;
    for (side, entry) in file.teams.iter() {
        let team = teams.get(side);
        insert_roster(&tx, game_id, team.id, entry)?;
    }
    insert_plays(&tx, game_id, file)?;

    let game = read_game(&tx, game_id)?;
    tx.commit().context("Failed to commit game import")?;
    info!(
        "Stored game #{} {}: {} {} at {} {}",
        game.id,
        game.key.date,
        teams.away.code,
        game.visitor.runs,
        teams.home.code,
        game.home.runs
    );
    Ok(ImportOutcome::Created(game))
}

fn totals(entry: &TeamEntry) -> TeamTotals {
    entry
        .line_score
        .as_ref()
        .map(|ls| TeamTotals {
            runs: ls.runs,
            hits: ls.hits,
            errors: ls.errors,
            left_on_base: ls.left_on_base,
        })
        .unwrap_or_default()
}

/// Returns `None` when the key is already taken.
pub(crate) fn insert_game(conn: &Connection, key: &GameKey, file: &GameFile) -> Result<Option<RowId>> {
    let venue = &file.venue;
    let visitor = totals(&file.teams.away);
    let home = totals(&file.teams.home);
    let inserted = conn
        .execute(
            "INSERT INTO games (
                date, start_time, doubleheader, location, stadium, duration, attendance,
                scheduled_innings, weather, is_league_game, is_complete, used_dh,
                visitor_team_id, home_team_id,
                visitor_runs, visitor_hits, visitor_errors, visitor_lob,
                home_runs, home_hits, home_errors, home_lob
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                       ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22)
             ON CONFLICT(date, visitor_team_id, home_team_id, start_time, doubleheader) DO NOTHING",
            params![
                key.date,
                key.start_time,
                key.doubleheader,
                venue.location,
                venue.stadium,
                venue.duration,
                venue.attendance,
                venue.scheduled_innings,
                venue.weather,
                venue.is_league_game,
                file.is_complete,
                venue.used_dh,
                key.visitor_team_id,
                key.home_team_id,
                visitor.runs,
                visitor.hits,
                visitor.errors,
                visitor.left_on_base,
                home.runs,
                home.hits,
                home.errors,
                home.left_on_base,
            ],
        )
        .context("Failed to insert game")?;
    Ok((inserted > 0).then(|| conn.last_insert_rowid()))
}

fn read_game(conn: &Connection, game_id: RowId) -> Result<Game> {
    conn.query_row(
        &format!("SELECT {} FROM games WHERE id = ?1", Game::COLUMNS),
        params![game_id],
        Game::from_row,
    )
    .with_context(|| format!("Failed to read game #{game_id}"))
}

/// One row per inning, merging the two sides' line scores. A side that did not report
/// an inning scores "0" there.
fn insert_inning_scores(conn: &Connection, game_id: RowId, teams: &Matchup<TeamEntry>) -> Result<()> {
    let mut innings: BTreeMap<u32, (String, String)> = BTreeMap::new();
    for (side, entry) in teams.iter() {
        let Some(line_score) = entry.line_score.as_ref() else {
            continue;
        };
        for (inning, score) in &line_score.innings {
            let row = innings
                .entry(*inning)
                .or_insert_with(|| (String::from("0"), String::from("0")));
            match side {
                Side::Away => row.0.clone_from(score),
                Side::Home => row.1.clone_from(score),
            }
        }
    }
    let mut stmt = conn.prepare_cached(
        "INSERT INTO inning_scores (game_id, inning, visitor_score, home_score)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (inning, (visitor, home)) in &innings {
        stmt.execute(params![game_id, inning, visitor, home])?;
    }
    debug!("Game #{}: {} innings", game_id, innings.len());
    Ok(())
}

fn insert_roster(conn: &Connection, game_id: RowId, team_id: RowId, entry: &TeamEntry) -> Result<()> {
    let mut lines = 0;
    for player_entry in &entry.players {
        let player = resolve_player(conn, player_entry, team_id)?;
        if !player_entry.appeared() {
            continue;
        }
        lines += insert_player_lines(conn, game_id, team_id, player.id, player_entry)
            .with_context(|| format!("Failed to store lines for {}", player_entry.name))?;
    }
    debug!("Game #{}, team #{}: {} stat lines", game_id, team_id, lines);
    Ok(())
}

fn insert_player_lines(
    conn: &Connection,
    game_id: RowId,
    team_id: RowId,
    player_id: RowId,
    entry: &PlayerEntry,
) -> Result<usize> {
    let mut written = 0;
    if let Some(b) = &entry.hitting {
        conn.prepare_cached(
            "INSERT INTO batting_stats (
                game_id, player_id, team_id, batting_order, position, is_starter, is_sub,
                ab, r, h, rbi, doubles, triples, hr, bb, so, sb, cs, hbp, sh, sf, gdp, ibb,
                ground, fly, kl
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                       ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26)",
        )?
        .execute(params![
            game_id,
            player_id,
            team_id,
            entry.batting_order,
            entry.position,
            entry.is_starter(),
            entry.is_sub,
            b.at_bats,
            b.runs,
            b.hits,
            b.rbi,
            b.doubles,
            b.triples,
            b.home_runs,
            b.walks,
            b.strikeouts,
            b.stolen_bases,
            b.caught_stealing,
            b.hit_by_pitch,
            b.sacrifice_hits,
            b.sacrifice_flies,
            b.grounded_into_double_plays,
            b.intentional_walks,
            b.ground_outs,
            b.fly_outs,
            b.strikeouts_looking,
        ])?;
        written += 1;
    }
    if let Some(f) = &entry.fielding {
        conn.prepare_cached(
            "INSERT INTO fielding_stats (game_id, player_id, team_id, position, po, a, e, pb, ci, sba)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?
        .execute(params![
            game_id,
            player_id,
            team_id,
            entry.position,
            f.putouts,
            f.assists,
            f.errors,
            f.passed_balls,
            f.catchers_interference,
            f.stolen_bases_against,
        ])?;
        written += 1;
    }
    if let Some(p) = &entry.pitching {
        conn.prepare_cached(
            "INSERT INTO pitching_stats (
                game_id, player_id, team_id, appear, gs, ip, ab, h, r, er, bb, so, hr, doubles,
                triples, hbp, bf, wp, bk, ibb, fly, ground, kl, pitches, strikes, cg, sho,
                win, loss, save
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                       ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30)",
        )?
        .execute(params![
            game_id,
            player_id,
            team_id,
            p.appearances,
            p.games_started,
            p.innings_pitched,
            p.at_bats,
            p.hits,
            p.runs,
            p.earned_runs,
            p.walks,
            p.strikeouts,
            p.home_runs,
            p.doubles,
            p.triples,
            p.hit_by_pitch,
            p.batters_faced,
            p.wild_pitches,
            p.balks,
            p.intentional_walks,
            p.fly_outs,
            p.ground_outs,
            p.strikeouts_looking,
            p.pitches,
            p.strikes,
            p.complete_games,
            p.shutouts,
            p.win,
            p.loss,
            p.save,
        ])?;
        written += 1;
    }
    Ok(written)
}

fn insert_plays(conn: &Connection, game_id: RowId, file: &GameFile) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO plays (
            game_id, inning, half, sequence, outs_before, batter_name, pitcher_name,
            pitch_sequence, narrative
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    for play in &file.plays {
        stmt.execute(params![
            game_id,
            play.inning,
            play.half.as_ref(),
            play.sequence,
            play.outs_before,
            play.batter,
            play.pitcher,
            play.pitch_sequence,
            play.narrative,
        ])?;
    }
    debug!("Game #{}: {} plays", game_id, file.plays.len());
    Ok(())
}
