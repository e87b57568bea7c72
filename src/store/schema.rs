//! SQLite tables for seasons, teams, players, games and their per-game lines.
//!
//! Natural keys are `UNIQUE` constraints so that duplicate detection is decided by
//! the database, not by a read-then-write in application code:
//! - teams: `(code, season_id)`
//! - players: `(name, uniform_number, team_id)`
//! - games: `(date, visitor_team_id, home_team_id, start_time, doubleheader)`
//!
//! Key columns are `NOT NULL` because SQLite treats NULLs as distinct in unique indexes.

use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS seasons (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            rules TEXT NOT NULL DEFAULT 'rules_hs_sb',
            gender TEXT NOT NULL DEFAULT 'female',
            play_entry_mode TEXT NOT NULL DEFAULT 'box_game_totals'
        );

        CREATE TABLE IF NOT EXISTS teams (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL,
            team_id TEXT,
            name TEXT NOT NULL,
            season_id INTEGER NOT NULL REFERENCES seasons(id),
            stadium TEXT NOT NULL DEFAULT '',
            city TEXT NOT NULL DEFAULT '',
            state TEXT NOT NULL DEFAULT '',
            mascot TEXT NOT NULL DEFAULT '',
            print_name TEXT NOT NULL DEFAULT '',
            abbreviation TEXT NOT NULL DEFAULT '',
            league TEXT NOT NULL DEFAULT '',
            division TEXT NOT NULL DEFAULT '',
            coach TEXT NOT NULL DEFAULT '',
            conference TEXT NOT NULL DEFAULT '',
            UNIQUE(code, season_id)
        );

        CREATE TABLE IF NOT EXISTS players (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            external_id TEXT,
            name TEXT NOT NULL,
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            short_name TEXT NOT NULL DEFAULT '',
            uniform_number TEXT NOT NULL DEFAULT '',
            position TEXT NOT NULL DEFAULT '',
            bats TEXT NOT NULL DEFAULT '',
            throws TEXT NOT NULL DEFAULT '',
            player_class TEXT NOT NULL DEFAULT '',
            height TEXT NOT NULL DEFAULT '',
            weight TEXT NOT NULL DEFAULT '',
            hometown TEXT NOT NULL DEFAULT '',
            disabled INTEGER NOT NULL DEFAULT 0,
            team_id INTEGER NOT NULL REFERENCES teams(id),
            UNIQUE(name, uniform_number, team_id)
        );

        CREATE TABLE IF NOT EXISTS games (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            start_time TEXT NOT NULL DEFAULT '',
            doubleheader INTEGER NOT NULL DEFAULT 0,
            location TEXT NOT NULL DEFAULT '',
            stadium TEXT NOT NULL DEFAULT '',
            duration TEXT NOT NULL DEFAULT '',
            attendance INTEGER NOT NULL DEFAULT 0,
            scheduled_innings INTEGER NOT NULL DEFAULT 7,
            weather TEXT NOT NULL DEFAULT '',
            is_league_game INTEGER NOT NULL DEFAULT 1,
            is_complete INTEGER NOT NULL DEFAULT 0,
            used_dh TEXT NOT NULL DEFAULT 'N',
            visitor_team_id INTEGER NOT NULL REFERENCES teams(id),
            home_team_id INTEGER NOT NULL REFERENCES teams(id),
            visitor_runs INTEGER NOT NULL DEFAULT 0,
            visitor_hits INTEGER NOT NULL DEFAULT 0,
            visitor_errors INTEGER NOT NULL DEFAULT 0,
            visitor_lob INTEGER NOT NULL DEFAULT 0,
            home_runs INTEGER NOT NULL DEFAULT 0,
            home_hits INTEGER NOT NULL DEFAULT 0,
            home_errors INTEGER NOT NULL DEFAULT 0,
            home_lob INTEGER NOT NULL DEFAULT 0,
            UNIQUE(date, visitor_team_id, home_team_id, start_time, doubleheader)
        );

        CREATE TABLE IF NOT EXISTS inning_scores (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            game_id INTEGER NOT NULL REFERENCES games(id),
            inning INTEGER NOT NULL,
            visitor_score TEXT NOT NULL DEFAULT '0',
            home_score TEXT NOT NULL DEFAULT '0',
            UNIQUE(game_id, inning)
        );

        CREATE TABLE IF NOT EXISTS batting_stats (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            game_id INTEGER NOT NULL REFERENCES games(id),
            player_id INTEGER NOT NULL REFERENCES players(id),
            team_id INTEGER NOT NULL REFERENCES teams(id),
            batting_order INTEGER NOT NULL DEFAULT 0,
            position TEXT NOT NULL DEFAULT '',
            is_starter INTEGER NOT NULL DEFAULT 0,
            is_sub INTEGER NOT NULL DEFAULT 0,
            ab INTEGER NOT NULL DEFAULT 0,
            r INTEGER NOT NULL DEFAULT 0,
            h INTEGER NOT NULL DEFAULT 0,
            rbi INTEGER NOT NULL DEFAULT 0,
            doubles INTEGER NOT NULL DEFAULT 0,
            triples INTEGER NOT NULL DEFAULT 0,
            hr INTEGER NOT NULL DEFAULT 0,
            bb INTEGER NOT NULL DEFAULT 0,
            so INTEGER NOT NULL DEFAULT 0,
            sb INTEGER NOT NULL DEFAULT 0,
            cs INTEGER NOT NULL DEFAULT 0,
            hbp INTEGER NOT NULL DEFAULT 0,
            sh INTEGER NOT NULL DEFAULT 0,
            sf INTEGER NOT NULL DEFAULT 0,
            gdp INTEGER NOT NULL DEFAULT 0,
            ibb INTEGER NOT NULL DEFAULT 0,
            ground INTEGER NOT NULL DEFAULT 0,
            fly INTEGER NOT NULL DEFAULT 0,
            kl INTEGER NOT NULL DEFAULT 0,
            UNIQUE(game_id, player_id, team_id)
        );

        CREATE TABLE IF NOT EXISTS pitching_stats (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            game_id INTEGER NOT NULL REFERENCES games(id),
            player_id INTEGER NOT NULL REFERENCES players(id),
            team_id INTEGER NOT NULL REFERENCES teams(id),
            appear INTEGER NOT NULL DEFAULT 0,
            gs INTEGER NOT NULL DEFAULT 0,
            ip TEXT NOT NULL DEFAULT '0.0',
            ab INTEGER NOT NULL DEFAULT 0,
            h INTEGER NOT NULL DEFAULT 0,
            r INTEGER NOT NULL DEFAULT 0,
            er INTEGER NOT NULL DEFAULT 0,
            bb INTEGER NOT NULL DEFAULT 0,
            so INTEGER NOT NULL DEFAULT 0,
            hr INTEGER NOT NULL DEFAULT 0,
            doubles INTEGER NOT NULL DEFAULT 0,
            triples INTEGER NOT NULL DEFAULT 0,
            hbp INTEGER NOT NULL DEFAULT 0,
            bf INTEGER NOT NULL DEFAULT 0,
            wp INTEGER NOT NULL DEFAULT 0,
            bk INTEGER NOT NULL DEFAULT 0,
            ibb INTEGER NOT NULL DEFAULT 0,
            fly INTEGER NOT NULL DEFAULT 0,
            ground INTEGER NOT NULL DEFAULT 0,
            kl INTEGER NOT NULL DEFAULT 0,
            pitches INTEGER NOT NULL DEFAULT 0,
            strikes INTEGER NOT NULL DEFAULT 0,
            cg INTEGER NOT NULL DEFAULT 0,
            sho INTEGER NOT NULL DEFAULT 0,
            win INTEGER NOT NULL DEFAULT 0,
            loss INTEGER NOT NULL DEFAULT 0,
            save INTEGER NOT NULL DEFAULT 0,
            UNIQUE(game_id, player_id, team_id)
        );

        CREATE TABLE IF NOT EXISTS fielding_stats (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            game_id INTEGER NOT NULL REFERENCES games(id),
            player_id INTEGER NOT NULL REFERENCES players(id),
            team_id INTEGER NOT NULL REFERENCES teams(id),
            position TEXT NOT NULL DEFAULT '',
            po INTEGER NOT NULL DEFAULT 0,
            a INTEGER NOT NULL DEFAULT 0,
            e INTEGER NOT NULL DEFAULT 0,
            pb INTEGER NOT NULL DEFAULT 0,
            ci INTEGER NOT NULL DEFAULT 0,
            sba INTEGER NOT NULL DEFAULT 0,
            UNIQUE(game_id, player_id, team_id)
        );

        CREATE TABLE IF NOT EXISTS plays (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            game_id INTEGER NOT NULL REFERENCES games(id),
            inning INTEGER NOT NULL,
            half TEXT NOT NULL,
            sequence INTEGER NOT NULL,
            outs_before INTEGER NOT NULL DEFAULT 0,
            batter_name TEXT NOT NULL DEFAULT '',
            pitcher_name TEXT NOT NULL DEFAULT '',
            pitch_sequence TEXT NOT NULL DEFAULT '',
            narrative TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_batting_player ON batting_stats(player_id);
        CREATE INDEX IF NOT EXISTS idx_pitching_player ON pitching_stats(player_id);
        CREATE INDEX IF NOT EXISTS idx_fielding_player ON fielding_stats(player_id);
        CREATE INDEX IF NOT EXISTS idx_plays_game ON plays(game_id, inning, sequence);
        "#,
    )
    .context("Failed to create tables")
}
