use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::Row;
use serde::Serialize;

use crate::game_file::traits::{InningHalf, Side};
use crate::lines::{BattingCounts, FieldingCounts, PitchingCounts};
use crate::season::{slugify, Gender, PlayEntryMode, Ruleset};

pub type RowId = i64;

const GAME_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];

/// Reads a TEXT column through `FromStr`, surfacing bad values as conversion failures.
fn parse_column<T>(row: &Row<'_>, column: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(column)?;
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
    })
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize)]
pub struct Season {
    pub id: RowId,
    pub name: String,
    pub rules: Ruleset,
    pub gender: Gender,
    pub play_entry_mode: PlayEntryMode,
}

impl Season {
    pub const COLUMNS: &'static str = "id, name, rules, gender, play_entry_mode";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            rules: parse_column(row, "rules")?,
            gender: parse_column(row, "gender")?,
            play_entry_mode: parse_column(row, "play_entry_mode")?,
        })
    }

    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize)]
pub struct Team {
    pub id: RowId,
    pub code: String,
    pub external_id: Option<String>,
    pub name: String,
    pub season_id: RowId,
    pub stadium: String,
    pub city: String,
    pub state: String,
    pub mascot: String,
    pub print_name: String,
    pub abbreviation: String,
    pub league: String,
    pub division: String,
    pub coach: String,
    pub conference: String,
}

impl Team {
    pub const COLUMNS: &'static str = "id, code, team_id, name, season_id, stadium, city, state, \
         mascot, print_name, abbreviation, league, division, coach, conference";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            code: row.get("code")?,
            external_id: row.get("team_id")?,
            name: row.get("name")?,
            season_id: row.get("season_id")?,
            stadium: row.get("stadium")?,
            city: row.get("city")?,
            state: row.get("state")?,
            mascot: row.get("mascot")?,
            print_name: row.get("print_name")?,
            abbreviation: row.get("abbreviation")?,
            league: row.get("league")?,
            division: row.get("division")?,
            coach: row.get("coach")?,
            conference: row.get("conference")?,
        })
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize)]
pub struct Player {
    pub id: RowId,
    pub external_id: Option<String>,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub short_name: String,
    pub uniform_number: String,
    pub position: String,
    pub bats: String,
    pub throws: String,
    pub player_class: String,
    pub height: String,
    pub weight: String,
    pub hometown: String,
    pub disabled: bool,
    pub team_id: RowId,
}

impl Player {
    pub const COLUMNS: &'static str = "id, external_id, name, first_name, last_name, short_name, \
         uniform_number, position, bats, throws, player_class, height, weight, hometown, disabled, \
         team_id";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            external_id: row.get("external_id")?,
            name: row.get("name")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            short_name: row.get("short_name")?,
            uniform_number: row.get("uniform_number")?,
            position: row.get("position")?,
            bats: row.get("bats")?,
            throws: row.get("throws")?,
            player_class: row.get("player_class")?,
            height: row.get("height")?,
            weight: row.get("weight")?,
            hometown: row.get("hometown")?,
            disabled: row.get("disabled")?,
            team_id: row.get("team_id")?,
        })
    }
}

/// Runs, hits, errors and runners left on base for one side of a game.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize)]
pub struct TeamTotals {
    pub runs: u32,
    pub hits: u32,
    pub errors: u32,
    pub left_on_base: u32,
}

/// Natural key of a game. Two files describing the same key are the same game.
#[derive(Debug, Eq, PartialEq, Clone, Hash, Serialize)]
pub struct GameKey {
    pub date: String,
    pub visitor_team_id: RowId,
    pub home_team_id: RowId,
    pub start_time: String,
    pub doubleheader: u32,
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize)]
pub struct Game {
    pub id: RowId,
    pub key: GameKey,
    pub location: String,
    pub stadium: String,
    pub duration: String,
    pub attendance: u32,
    pub scheduled_innings: u32,
    pub weather: String,
    pub is_league_game: bool,
    pub is_complete: bool,
    pub used_dh: String,
    pub visitor: TeamTotals,
    pub home: TeamTotals,
}

impl Game {
    pub const COLUMNS: &'static str = "id, date, start_time, doubleheader, location, stadium, \
         duration, attendance, scheduled_innings, weather, is_league_game, is_complete, used_dh, \
         visitor_team_id, home_team_id, visitor_runs, visitor_hits, visitor_errors, visitor_lob, \
         home_runs, home_hits, home_errors, home_lob";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            key: GameKey {
                date: row.get("date")?,
                visitor_team_id: row.get("visitor_team_id")?,
                home_team_id: row.get("home_team_id")?,
                start_time: row.get("start_time")?,
                doubleheader: row.get("doubleheader")?,
            },
            location: row.get("location")?,
            stadium: row.get("stadium")?,
            duration: row.get("duration")?,
            attendance: row.get("attendance")?,
            scheduled_innings: row.get("scheduled_innings")?,
            weather: row.get("weather")?,
            is_league_game: row.get("is_league_game")?,
            is_complete: row.get("is_complete")?,
            used_dh: row.get("used_dh")?,
            visitor: TeamTotals {
                runs: row.get("visitor_runs")?,
                hits: row.get("visitor_hits")?,
                errors: row.get("visitor_errors")?,
                left_on_base: row.get("visitor_lob")?,
            },
            home: TeamTotals {
                runs: row.get("home_runs")?,
                hits: row.get("home_hits")?,
                errors: row.get("home_errors")?,
                left_on_base: row.get("home_lob")?,
            },
        })
    }

    pub const fn totals(&self, side: Side) -> &TeamTotals {
        match side {
            Side::Away => &self.visitor,
            Side::Home => &self.home,
        }
    }

    pub fn side_of(&self, team_id: RowId) -> Option<Side> {
        if team_id == self.key.home_team_id {
            Some(Side::Home)
        } else if team_id == self.key.visitor_team_id {
            Some(Side::Away)
        } else {
            None
        }
    }

    /// `MMDDYYYY_<visitor>_<home>_<doubleheader>`, with `VIS`/`HOM` standing in for
    /// teams that have no abbreviation and `00000000` for an unreadable date.
    pub fn slug(&self, visitor_abbreviation: &str, home_abbreviation: &str) -> String {
        let date = GAME_DATE_FORMATS
            .iter()
            .find_map(|f| NaiveDate::parse_from_str(self.key.date.trim(), f).ok())
            .map_or_else(|| String::from("00000000"), |d| d.format("%m%d%Y").to_string());
        let or = |abbr: &str, fallback: &str| {
            if abbr.is_empty() {
                fallback.to_string()
            } else {
                abbr.to_string()
            }
        };
        format!(
            "{}_{}_{}_{}",
            date,
            or(visitor_abbreviation, "VIS"),
            or(home_abbreviation, "HOM"),
            self.key.doubleheader
        )
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize)]
pub struct InningScore {
    pub game_id: RowId,
    pub inning: u32,
    pub visitor_score: String,
    pub home_score: String,
}

impl InningScore {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            game_id: row.get("game_id")?,
            inning: row.get("inning")?,
            visitor_score: row.get("visitor_score")?,
            home_score: row.get("home_score")?,
        })
    }
}

/// Which game, player and team a stored stat line belongs to.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash, Serialize)]
pub struct LineOwner {
    pub game_id: RowId,
    pub player_id: RowId,
    pub team_id: RowId,
}

impl LineOwner {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            game_id: row.get("game_id")?,
            player_id: row.get("player_id")?,
            team_id: row.get("team_id")?,
        })
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize)]
pub struct BattingLine {
    #[serde(flatten)]
    pub owner: LineOwner,
    pub batting_order: u32,
    pub position: String,
    pub is_starter: bool,
    pub is_sub: bool,
    #[serde(flatten)]
    pub stats: BattingCounts,
}

impl BattingLine {
    pub const COLUMNS: &'static str = "game_id, player_id, team_id, batting_order, position, \
         is_starter, is_sub, ab, r, h, rbi, doubles, triples, hr, bb, so, sb, cs, hbp, sh, sf, \
         gdp, ibb, ground, fly, kl";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            owner: LineOwner::from_row(row)?,
            batting_order: row.get("batting_order")?,
            position: row.get("position")?,
            is_starter: row.get("is_starter")?,
            is_sub: row.get("is_sub")?,
            stats: BattingCounts {
                at_bats: row.get("ab")?,
                runs: row.get("r")?,
                hits: row.get("h")?,
                rbi: row.get("rbi")?,
                doubles: row.get("doubles")?,
                triples: row.get("triples")?,
                home_runs: row.get("hr")?,
                walks: row.get("bb")?,
                strikeouts: row.get("so")?,
                stolen_bases: row.get("sb")?,
                caught_stealing: row.get("cs")?,
                hit_by_pitch: row.get("hbp")?,
                sacrifice_hits: row.get("sh")?,
                sacrifice_flies: row.get("sf")?,
                grounded_into_double_plays: row.get("gdp")?,
                intentional_walks: row.get("ibb")?,
                ground_outs: row.get("ground")?,
                fly_outs: row.get("fly")?,
                strikeouts_looking: row.get("kl")?,
            },
        })
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize)]
pub struct PitchingLine {
    #[serde(flatten)]
    pub owner: LineOwner,
    #[serde(flatten)]
    pub stats: PitchingCounts,
}

impl PitchingLine {
    pub const COLUMNS: &'static str = "game_id, player_id, team_id, appear, gs, ip, ab, h, r, er, \
         bb, so, hr, doubles, triples, hbp, bf, wp, bk, ibb, fly, ground, kl, pitches, strikes, \
         cg, sho, win, loss, save";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            owner: LineOwner::from_row(row)?,
            stats: PitchingCounts {
                appearances: row.get("appear")?,
                games_started: row.get("gs")?,
                innings_pitched: row.get("ip")?,
                at_bats: row.get("ab")?,
                hits: row.get("h")?,
                runs: row.get("r")?,
                earned_runs: row.get("er")?,
                walks: row.get("bb")?,
                strikeouts: row.get("so")?,
                home_runs: row.get("hr")?,
                doubles: row.get("doubles")?,
                triples: row.get("triples")?,
                hit_by_pitch: row.get("hbp")?,
                batters_faced: row.get("bf")?,
                wild_pitches: row.get("wp")?,
                balks: row.get("bk")?,
                intentional_walks: row.get("ibb")?,
                fly_outs: row.get("fly")?,
                ground_outs: row.get("ground")?,
                strikeouts_looking: row.get("kl")?,
                pitches: row.get("pitches")?,
                strikes: row.get("strikes")?,
                complete_games: row.get("cg")?,
                shutouts: row.get("sho")?,
                win: row.get("win")?,
                loss: row.get("loss")?,
                save: row.get("save")?,
            },
        })
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize)]
pub struct FieldingLine {
    #[serde(flatten)]
    pub owner: LineOwner,
    pub position: String,
    #[serde(flatten)]
    pub stats: FieldingCounts,
}

impl FieldingLine {
    pub const COLUMNS: &'static str = "game_id, player_id, team_id, position, po, a, e, pb, ci, sba";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            owner: LineOwner::from_row(row)?,
            position: row.get("position")?,
            stats: FieldingCounts {
                putouts: row.get("po")?,
                assists: row.get("a")?,
                errors: row.get("e")?,
                passed_balls: row.get("pb")?,
                catchers_interference: row.get("ci")?,
                stolen_bases_against: row.get("sba")?,
            },
        })
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize)]
pub struct PlayEvent {
    pub game_id: RowId,
    pub inning: u32,
    pub half: InningHalf,
    pub sequence: u32,
    pub outs_before: u32,
    pub batter_name: String,
    pub pitcher_name: String,
    pub pitch_sequence: String,
    pub narrative: String,
}

impl PlayEvent {
    pub const COLUMNS: &'static str = "game_id, inning, half, sequence, outs_before, batter_name, \
         pitcher_name, pitch_sequence, narrative";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let half: String = row.get("half")?;
        Ok(Self {
            game_id: row.get("game_id")?,
            inning: row.get("inning")?,
            half: if half == InningHalf::Top.as_ref() {
                InningHalf::Top
            } else {
                InningHalf::Bottom
            },
            sequence: row.get("sequence")?,
            outs_before: row.get("outs_before")?,
            batter_name: row.get("batter_name")?,
            pitcher_name: row.get("pitcher_name")?,
            pitch_sequence: row.get("pitch_sequence")?,
            narrative: row.get("narrative")?,
        })
    }
}
