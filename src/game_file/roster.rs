use std::str::FromStr;

use itertools::Itertools;
use roxmltree::Node;
use serde::Serialize;
use tracing::debug;

use crate::error::ValidationError;
use crate::game_file::parser::ParseOptions;
use crate::game_file::traits::{child, children, FromElement, Inning, Side};
use crate::lines::{BattingCounts, FieldingCounts, InningsPitched, PitchingCounts};
use crate::util::{coerce_flag, coerce_int, coerce_yes_no, non_empty, text};

/// Team totals and runs by inning from a `linescore` block.
#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize)]
pub struct LineScore {
    pub runs: u32,
    pub hits: u32,
    pub errors: u32,
    pub left_on_base: u32,
    /// Kept as text: unplayed innings carry markers such as "X".
    pub innings: Vec<(Inning, String)>,
}

impl FromElement for LineScore {
    fn from_element(node: Node<'_, '_>, _options: &ParseOptions) -> Result<Self, ValidationError> {
        let a = |name: &str| node.attribute(name);
        let innings = children(node, "lineinn")
            .map(|inn| {
                let score = inn
                    .attribute("score")
                    .map_or_else(|| String::from("0"), |s| text(Some(s)));
                (coerce_int(inn.attribute("inn"), 0), score)
            })
            .collect();
        Ok(Self {
            runs: coerce_int(a("runs"), 0),
            hits: coerce_int(a("hits"), 0),
            errors: coerce_int(a("errs"), 0),
            left_on_base: coerce_int(a("lob"), 0),
            innings,
        })
    }
}

/// One `player` block: roster attributes plus the stat lines recorded for this game.
#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize)]
pub struct PlayerEntry {
    pub name: String,
    pub short_name: String,
    pub uniform_number: String,
    pub external_id: Option<String>,
    pub bats: String,
    pub throws: String,
    pub player_class: String,
    pub games_played: u32,
    pub games_started: u32,
    pub batting_order: u32,
    pub position: String,
    pub is_sub: bool,
    pub hitting: Option<BattingCounts>,
    pub pitching: Option<PitchingCounts>,
    pub fielding: Option<FieldingCounts>,
}

impl PlayerEntry {
    /// Players listed with zero games played are on the roster but did not appear.
    pub const fn appeared(&self) -> bool {
        self.games_played > 0
    }

    pub const fn is_starter(&self) -> bool {
        self.games_started == 1
    }
}

impl FromElement for PlayerEntry {
    fn from_element(node: Node<'_, '_>, options: &ParseOptions) -> Result<Self, ValidationError> {
        let a = |name: &str| node.attribute(name);
        let name = text(a("name"));
        let short_name = a("shortname").map_or_else(|| name.clone(), |s| text(Some(s)));
        Ok(Self {
            short_name,
            uniform_number: text(a("uni")),
            external_id: non_empty(a("playerId")),
            bats: text(a("bats")),
            throws: text(a("throws")),
            player_class: text(a("class")),
            games_played: coerce_int(a("gp"), 0),
            games_started: coerce_int(a("gs"), 0),
            batting_order: coerce_int(a("spot"), 0),
            position: text(a("pos")),
            is_sub: coerce_yes_no(a("sub")) || coerce_int::<u32>(a("sub"), 0) == 1,
            hitting: child(node, "hitting").map(hitting_counts),
            pitching: child(node, "pitching").map(|p| pitching_counts(p, options)),
            fielding: child(node, "fielding").map(fielding_counts),
            name,
        })
    }
}

fn hitting_counts(node: Node<'_, '_>) -> BattingCounts {
    let u = |name: &str| coerce_int(node.attribute(name), 0);
    BattingCounts {
        at_bats: u("ab"),
        runs: u("r"),
        hits: u("h"),
        rbi: u("rbi"),
        doubles: u("double"),
        triples: u("triple"),
        home_runs: u("hr"),
        walks: u("bb"),
        strikeouts: u("so"),
        stolen_bases: u("sb"),
        caught_stealing: u("cs"),
        hit_by_pitch: u("hbp"),
        sacrifice_hits: u("sh"),
        sacrifice_flies: u("sf"),
        grounded_into_double_plays: u("gdp"),
        intentional_walks: u("ibb"),
        ground_outs: u("ground"),
        fly_outs: u("fly"),
        strikeouts_looking: u("kl"),
    }
}

fn pitching_counts(node: Node<'_, '_>, options: &ParseOptions) -> PitchingCounts {
    let u = |name: &str| coerce_int(node.attribute(name), 0);
    let flag = |name: &str| coerce_flag(node.attribute(name), options.flag_coercion);
    PitchingCounts {
        appearances: u("appear"),
        games_started: u("gs"),
        innings_pitched: InningsPitched::coerce(node.attribute("ip")),
        at_bats: u("ab"),
        hits: u("h"),
        runs: u("r"),
        earned_runs: u("er"),
        walks: u("bb"),
        strikeouts: u("so"),
        home_runs: u("hr"),
        doubles: u("double"),
        triples: u("triple"),
        hit_by_pitch: u("hbp"),
        batters_faced: u("bf"),
        wild_pitches: u("wp"),
        balks: u("bk"),
        intentional_walks: u("ibb"),
        fly_outs: u("fly"),
        ground_outs: u("ground"),
        strikeouts_looking: u("kl"),
        pitches: u("pitches"),
        strikes: u("strikes"),
        complete_games: u("cg"),
        shutouts: u("sho"),
        win: flag("win"),
        loss: flag("loss"),
        save: flag("save"),
    }
}

fn fielding_counts(node: Node<'_, '_>) -> FieldingCounts {
    let u = |name: &str| coerce_int(node.attribute(name), 0);
    FieldingCounts {
        putouts: u("po"),
        assists: u("a"),
        errors: u("e"),
        passed_balls: u("pb"),
        catchers_interference: u("ci"),
        stolen_bases_against: u("sba"),
    }
}

/// One `team` block. The side is mandatory; everything else falls back to defaults.
#[derive(Debug, Eq, PartialEq, Clone, Serialize)]
pub struct TeamEntry {
    pub side: Side,
    pub code: String,
    pub external_id: Option<String>,
    pub name: String,
    pub line_score: Option<LineScore>,
    pub players: Vec<PlayerEntry>,
}

impl FromElement for TeamEntry {
    fn from_element(node: Node<'_, '_>, options: &ParseOptions) -> Result<Self, ValidationError> {
        let code = text(node.attribute("code"));
        let vh = text(node.attribute("vh"));
        let side = Side::from_str(&vh).map_err(|_| ValidationError::UnknownSide {
            code: code.clone(),
            vh: vh.clone(),
        })?;
        let line_score = child(node, "linescore")
            .map(|ls| LineScore::from_element(ls, options))
            .transpose()?;
        let players = children(node, "player")
            .map(|p| PlayerEntry::from_element(p, options))
            .collect::<Result<Vec<_>, _>>()?;
        // Stat lines are keyed by player, so one player can hold only one line set.
        if let Some(twice) = players
            .iter()
            .filter(|p| p.appeared())
            .duplicates_by(|p| (&p.name, &p.uniform_number))
            .next()
        {
            return Err(ValidationError::DuplicatePlayer {
                code,
                name: twice.name.clone(),
                uniform_number: twice.uniform_number.clone(),
            });
        }
        debug!("Team {} ({}): {} players", code, side, players.len());
        Ok(Self {
            side,
            external_id: non_empty(node.attribute("id")),
            name: text(node.attribute("name")),
            code,
            line_score,
            players,
        })
    }
}
