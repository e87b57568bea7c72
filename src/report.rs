//! Read-only views assembled from stored entities and their aggregates.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use itertools::Itertools;
use rusqlite::Connection;
use serde::Serialize;
use strum_macros::Display;

use crate::game_file::traits::{Matchup, Side};
use crate::season::Ruleset;
use crate::stats::{
    aggregate_batting, aggregate_fielding, aggregate_pitching, BattingSummary, FieldingSummary,
    PitchingSummary,
};
use crate::store::models::{
    BattingLine, Game, InningScore, PitchingLine, PlayEvent, Player, RowId, Season, Team,
};
use crate::store::queries;

fn season_of(conn: &Connection, team: &Team) -> Result<Season> {
    conn.query_row(
        &format!("SELECT {} FROM seasons WHERE id = ?1", Season::COLUMNS),
        [team.season_id],
        Season::from_row,
    )
    .with_context(|| format!("Failed to read season of team {}", team.code))
}

fn team_of(conn: &Connection, team_id: RowId) -> Result<Team> {
    queries::team(conn, team_id)?.with_context(|| format!("Team #{team_id} not found"))
}

#[derive(Debug, Clone, Serialize)]
pub struct GameLogEntry {
    pub game: Game,
    pub batting: Option<BattingLine>,
    pub pitching: Option<PitchingLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerReport {
    pub player: Player,
    pub team: Team,
    pub batting: BattingSummary,
    pub pitching: PitchingSummary,
    pub fielding: FieldingSummary,
    pub game_log: Vec<GameLogEntry>,
}

pub fn player_report(conn: &Connection, player_id: RowId) -> Result<Option<PlayerReport>> {
    let Some(player) = queries::player(conn, player_id)? else {
        return Ok(None);
    };
    let team = team_of(conn, player.team_id)?;
    let rules = season_of(conn, &team)?.rules;

    let batting = queries::batting_for_player(conn, player.id)?;
    let pitching = queries::pitching_for_player(conn, player.id)?;
    let fielding = queries::fielding_for_player(conn, player.id)?;

    let game_ids = batting
        .iter()
        .map(|l| l.owner.game_id)
        .chain(pitching.iter().map(|l| l.owner.game_id))
        .collect::<BTreeSet<_>>();
    let game_log = game_ids
        .into_iter()
        .map(|game_id| {
            let game = queries::game(conn, game_id)?
                .with_context(|| format!("Game #{game_id} not found"))?;
            Ok(GameLogEntry {
                game,
                batting: batting.iter().find(|l| l.owner.game_id == game_id).cloned(),
                pitching: pitching.iter().find(|l| l.owner.game_id == game_id).cloned(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(PlayerReport {
        batting: aggregate_batting(&batting),
        pitching: aggregate_pitching(&pitching, rules.regulation_innings()),
        fielding: aggregate_fielding(&fielding),
        player,
        team,
        game_log,
    }))
}

/// Outcome of a game from one team's point of view. Unfinished games have none.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Display, Serialize)]
pub enum GameResult {
    #[strum(serialize = "W")]
    Win,
    #[strum(serialize = "L")]
    Loss,
    #[strum(serialize = "T")]
    Tie,
    #[strum(serialize = "-")]
    Pending,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleEntry {
    pub game: Game,
    pub opponent: Team,
    pub home: bool,
    pub result: GameResult,
    /// `"<ours>-<theirs>"` for completed games, empty otherwise.
    pub score: String,
}

impl ScheduleEntry {
    pub const fn home_away(&self) -> &'static str {
        if self.home {
            "vs"
        } else {
            "@"
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Leader<T> {
    pub player: Player,
    pub stats: T,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamReport {
    pub team: Team,
    pub season: Season,
    pub schedule: Vec<ScheduleEntry>,
    pub batting_leaders: Vec<Leader<BattingSummary>>,
    pub pitching_leaders: Vec<Leader<PitchingSummary>>,
}

fn schedule_entry(conn: &Connection, team: &Team, game: Game) -> Result<ScheduleEntry> {
    let side = game.side_of(team.id).unwrap_or(Side::Home);
    let (opponent_side, opponent_id) = match side {
        Side::Home => (Side::Away, game.key.visitor_team_id),
        Side::Away => (Side::Home, game.key.home_team_id),
    };
    let ours = game.totals(side).runs;
    let theirs = game.totals(opponent_side).runs;
    let (result, score) = if game.is_complete {
        let result = match ours.cmp(&theirs) {
            std::cmp::Ordering::Greater => GameResult::Win,
            std::cmp::Ordering::Less => GameResult::Loss,
            std::cmp::Ordering::Equal => GameResult::Tie,
        };
        (result, format!("{ours}-{theirs}"))
    } else {
        (GameResult::Pending, String::new())
    };
    Ok(ScheduleEntry {
        opponent: team_of(conn, opponent_id)?,
        home: side == Side::Home,
        result,
        score,
        game,
    })
}

fn batting_leaders(
    players: &[Player],
    lines: &[BattingLine],
) -> Vec<Leader<BattingSummary>> {
    let by_player = lines.iter().cloned().into_group_map_by(|l| l.owner.player_id);
    players
        .iter()
        .filter_map(|p| {
            let stats = aggregate_batting(by_player.get(&p.id)?);
            (stats.totals.at_bats > 0).then(|| Leader {
                player: p.clone(),
                stats,
            })
        })
        .sorted_by(|a, b| b.stats.avg.or_zero().total_cmp(&a.stats.avg.or_zero()))
        .collect()
}

fn pitching_leaders(
    players: &[Player],
    lines: &[PitchingLine],
    rules: Ruleset,
) -> Vec<Leader<PitchingSummary>> {
    let by_player = lines.iter().cloned().into_group_map_by(|l| l.owner.player_id);
    players
        .iter()
        .filter_map(|p| {
            let stats = aggregate_pitching(by_player.get(&p.id)?, rules.regulation_innings());
            (stats.innings_pitched.thirds() > 0).then(|| Leader {
                player: p.clone(),
                stats,
            })
        })
        .sorted_by(|a, b| a.stats.era.sort_key().total_cmp(&b.stats.era.sort_key()))
        .collect()
}

pub fn team_report(conn: &Connection, team_id: RowId) -> Result<Option<TeamReport>> {
    let Some(team) = queries::team(conn, team_id)? else {
        return Ok(None);
    };
    let season = season_of(conn, &team)?;
    let players = queries::players_on_team(conn, team.id)?;
    let batting = queries::batting_for_team(conn, team.id)?;
    let pitching = queries::pitching_for_team(conn, team.id)?;
    let schedule = queries::games_for_team(conn, team.id)?
        .into_iter()
        .map(|g| schedule_entry(conn, &team, g))
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(TeamReport {
        batting_leaders: batting_leaders(&players, &batting),
        pitching_leaders: pitching_leaders(&players, &pitching, season.rules),
        schedule,
        team,
        season,
    }))
}

#[derive(Debug, Clone, Serialize)]
pub struct BoxLine<T> {
    pub player: String,
    pub uniform_number: String,
    #[serde(flatten)]
    pub line: T,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoxScoreSide {
    pub team: Team,
    pub batting: Vec<BoxLine<BattingLine>>,
    pub pitching: Vec<BoxLine<PitchingLine>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoxScore {
    pub slug: String,
    pub game: Game,
    pub innings: Vec<InningScore>,
    pub sides: Matchup<BoxScoreSide>,
    pub plays: Vec<PlayEvent>,
}

fn box_lines<T>(
    conn: &Connection,
    lines: Vec<T>,
    player_id: impl Fn(&T) -> RowId,
) -> Result<Vec<BoxLine<T>>> {
    lines
        .into_iter()
        .map(|line| {
            let id = player_id(&line);
            let player = queries::player(conn, id)?.with_context(|| format!("Player #{id} not found"))?;
            Ok(BoxLine {
                player: player.short_name,
                uniform_number: player.uniform_number,
                line,
            })
        })
        .collect()
}

fn box_score_side(conn: &Connection, game_id: RowId, team_id: RowId) -> Result<BoxScoreSide> {
    let batting = queries::batting_in_game(conn, game_id, team_id)?;
    let pitching = queries::pitching_in_game(conn, game_id, team_id)?;
    Ok(BoxScoreSide {
        team: team_of(conn, team_id)?,
        batting: box_lines(conn, batting, |l| l.owner.player_id)?,
        pitching: box_lines(conn, pitching, |l| l.owner.player_id)?,
    })
}

pub fn box_score(conn: &Connection, game_id: RowId) -> Result<Option<BoxScore>> {
    let Some(game) = queries::game(conn, game_id)? else {
        return Ok(None);
    };
    let sides = Matchup::new(
        box_score_side(conn, game.id, game.key.visitor_team_id)?,
        box_score_side(conn, game.id, game.key.home_team_id)?,
    );
    Ok(Some(BoxScore {
        slug: game.slug(&sides.away.team.abbreviation, &sides.home.team.abbreviation),
        innings: queries::inning_scores(conn, game.id)?,
        plays: queries::plays(conn, game.id)?,
        sides,
        game,
    }))
}
