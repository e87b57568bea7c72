use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::debug;

use crate::game_file::roster::{PlayerEntry, TeamEntry};
use crate::store::models::{Player, RowId, Team};

/// Finds the team with this code in the season, creating it on first sight.
///
/// The insert and the read run against the `(code, season_id)` unique index, so two
/// resolvers racing on the same team both end up with the single stored row.
pub fn resolve_team(conn: &Connection, entry: &TeamEntry, season_id: RowId) -> Result<Team> {
    let inserted = conn
        .execute(
            "INSERT INTO teams (code, team_id, name, season_id) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(code, season_id) DO NOTHING",
            params![entry.code, entry.external_id, entry.name, season_id],
        )
        .with_context(|| format!("Failed to upsert team {}", entry.code))?;
    if inserted > 0 {
        debug!("Created team {} in season {}", entry.code, season_id);
    }
    conn.query_row(
        &format!(
            "SELECT {} FROM teams WHERE code = ?1 AND season_id = ?2",
            Team::COLUMNS
        ),
        params![entry.code, season_id],
        Team::from_row,
    )
    .with_context(|| format!("Failed to read back team {}", entry.code))
}

/// Finds the player by name and uniform number on the team, creating them on first sight.
///
/// A stored external id is never replaced. A player stored without one picks up the
/// incoming id, if any.
pub fn resolve_player(conn: &Connection, entry: &PlayerEntry, team_id: RowId) -> Result<Player> {
    conn.execute(
        "INSERT INTO players
             (external_id, name, short_name, uniform_number, bats, throws, player_class, team_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(name, uniform_number, team_id) DO UPDATE
             SET external_id = excluded.external_id
             WHERE players.external_id IS NULL AND excluded.external_id IS NOT NULL",
        params![
            entry.external_id,
            entry.name,
            entry.short_name,
            entry.uniform_number,
            entry.bats,
            entry.throws,
            entry.player_class,
            team_id,
        ],
    )
    .with_context(|| format!("Failed to upsert player {} #{}", entry.name, entry.uniform_number))?;
    conn.query_row(
        &format!(
            "SELECT {} FROM players WHERE name = ?1 AND uniform_number = ?2 AND team_id = ?3",
            Player::COLUMNS
        ),
        params![entry.name, entry.uniform_number, team_id],
        Player::from_row,
    )
    .with_context(|| format!("Failed to read back player {}", entry.name))
}
