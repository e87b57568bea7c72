use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::info;

use crate::season::{Gender, PlayEntryMode, Ruleset};
use models::{RowId, Season};

pub mod entities;
pub mod games;
pub mod models;
pub mod queries;
pub mod schema;

/// How long a writer waits for another connection's transaction before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// A SQLite database holding seasons, games and the stat lines recorded in them.
pub struct Store {
    conn: Connection,
}

/// Number of rows in each table.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize)]
pub struct RowCounts {
    pub seasons: u64,
    pub teams: u64,
    pub players: u64,
    pub games: u64,
    pub inning_scores: u64,
    pub batting: u64,
    pub pitching: u64,
    pub fielding: u64,
    pub plays: u64,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        schema::create_tables(&conn)?;
        info!("Opened database {}", path.display());
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        schema::create_tables(&conn)?;
        Ok(Self { conn })
    }

    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    pub fn create_season(&self, name: &str, rules: Ruleset) -> Result<Season> {
        self.create_season_with(name, rules, Gender::default(), PlayEntryMode::default())
    }

    pub fn create_season_with(
        &self,
        name: &str,
        rules: Ruleset,
        gender: Gender,
        play_entry_mode: PlayEntryMode,
    ) -> Result<Season> {
        self.conn
            .execute(
                "INSERT INTO seasons (name, rules, gender, play_entry_mode) VALUES (?1, ?2, ?3, ?4)",
                params![
                    name.trim(),
                    rules.to_string(),
                    gender.to_string(),
                    play_entry_mode.to_string()
                ],
            )
            .with_context(|| format!("Failed to create season {name}"))?;
        let id = self.conn.last_insert_rowid();
        info!("Created season #{} {:?} ({})", id, name, rules);
        self.season(id)?
            .with_context(|| format!("Season #{id} missing after insert"))
    }

    pub fn season(&self, id: RowId) -> Result<Option<Season>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM seasons WHERE id = ?1", Season::COLUMNS),
                params![id],
                Season::from_row,
            )
            .optional()
            .with_context(|| format!("Failed to read season #{id}"))
    }

    pub fn seasons(&self) -> Result<Vec<Season>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM seasons ORDER BY id", Season::COLUMNS))?;
        let seasons = stmt
            .query_map([], Season::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list seasons")?;
        Ok(seasons)
    }

    pub fn counts(&self) -> Result<RowCounts> {
        let count = |table: &str| -> Result<u64> {
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                .with_context(|| format!("Failed to count {table}"))
        };
        Ok(RowCounts {
            seasons: count("seasons")?,
            teams: count("teams")?,
            players: count("players")?,
            games: count("games")?,
            inning_scores: count("inning_scores")?,
            batting: count("batting_stats")?,
            pitching: count("pitching_stats")?,
            fielding: count("fielding_stats")?,
            plays: count("plays")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seasons_keep_their_rules() {
        let store = Store::open_in_memory().unwrap();
        let spring = store.create_season(" Spring 2025 ", Ruleset::NcaaSoftball).unwrap();
        store
            .create_season_with("Fall Ball", Ruleset::Mlb, Gender::Male, PlayEntryMode::PbpSimple)
            .unwrap();
        assert_eq!(spring.name, "Spring 2025");
        assert_eq!(spring.slug(), "spring-2025");

        let all = store.seasons().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].rules, Ruleset::Mlb);
        assert_eq!(all[1].gender, Gender::Male);
        assert_eq!(all[1].play_entry_mode, PlayEntryMode::PbpSimple);
        assert_eq!(store.season(999).unwrap(), None);
    }

    #[test]
    fn new_store_is_empty() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.counts().unwrap(), RowCounts::default());
    }
}
