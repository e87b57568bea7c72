use std::fmt;

use serde::{Serialize, Serializer};

use crate::lines::InningsPitched;
use crate::stats::{distinct_games, sum};
use crate::store::models::PitchingLine;

/// Earned run average scaled to a regulation game.
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum Era {
    Value(f64),
    /// Earned runs allowed without recording an out.
    Undefined,
}

impl Era {
    pub fn new(earned_runs: u32, thirds: u32, regulation_innings: u32) -> Self {
        if thirds == 0 {
            if earned_runs == 0 {
                Self::Value(0.0)
            } else {
                Self::Undefined
            }
        } else {
            Self::Value(
                f64::from(earned_runs) * f64::from(regulation_innings) * 3.0 / f64::from(thirds),
            )
        }
    }

    /// Sort key where lower is better and an undefined ERA sorts last.
    pub fn sort_key(self) -> f64 {
        match self {
            Self::Value(v) => v,
            Self::Undefined => f64::INFINITY,
        }
    }
}

impl Default for Era {
    fn default() -> Self {
        Self::Value(0.0)
    }
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v:.2}"),
            Self::Undefined => f.write_str("INF"),
        }
    }
}

impl Serialize for Era {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Walks plus hits per inning pitched, to two decimals.
#[derive(Debug, PartialEq, Copy, Clone, Default)]
pub struct Whip(f64);

impl Whip {
    pub fn new(walks_and_hits: u32, thirds: u32) -> Self {
        if thirds == 0 {
            Self(0.0)
        } else {
            Self(f64::from(walks_and_hits) * 3.0 / f64::from(thirds))
        }
    }
}

impl fmt::Display for Whip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Whip {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct PitchingSummary {
    pub games: u32,
    pub games_started: u32,
    pub innings_pitched: InningsPitched,
    pub hits: u32,
    pub runs: u32,
    pub earned_runs: u32,
    pub walks: u32,
    pub strikeouts: u32,
    pub home_runs: u32,
    pub hit_by_pitch: u32,
    pub batters_faced: u32,
    pub wild_pitches: u32,
    pub balks: u32,
    pub pitches: u32,
    pub strikes: u32,
    pub complete_games: u32,
    pub shutouts: u32,
    pub wins: u32,
    pub losses: u32,
    pub saves: u32,
    pub era: Era,
    pub whip: Whip,
}

/// Totals for a pitcher's lines. Innings are summed in outs so that `4.1 + 3.2` is 8.
pub fn aggregate_pitching(lines: &[PitchingLine], regulation_innings: u32) -> PitchingSummary {
    let mut s = PitchingSummary {
        games: distinct_games(lines.iter().map(|l| &l.owner)),
        ..PitchingSummary::default()
    };
    let mut thirds = 0_u32;
    for line in lines {
        let p = &line.stats;
        thirds = sum(&[thirds, p.innings_pitched.thirds()]);
        s.games_started = s.games_started.saturating_add(p.games_started);
        s.hits = s.hits.saturating_add(p.hits);
        s.runs = s.runs.saturating_add(p.runs);
        s.earned_runs = s.earned_runs.saturating_add(p.earned_runs);
        s.walks = s.walks.saturating_add(p.walks);
        s.strikeouts = s.strikeouts.saturating_add(p.strikeouts);
        s.home_runs = s.home_runs.saturating_add(p.home_runs);
        s.hit_by_pitch = s.hit_by_pitch.saturating_add(p.hit_by_pitch);
        s.batters_faced = s.batters_faced.saturating_add(p.batters_faced);
        s.wild_pitches = s.wild_pitches.saturating_add(p.wild_pitches);
        s.balks = s.balks.saturating_add(p.balks);
        s.pitches = s.pitches.saturating_add(p.pitches);
        s.strikes = s.strikes.saturating_add(p.strikes);
        s.complete_games = s.complete_games.saturating_add(p.complete_games);
        s.shutouts = s.shutouts.saturating_add(p.shutouts);
        s.wins = s.wins.saturating_add(u32::from(p.win));
        s.losses = s.losses.saturating_add(u32::from(p.loss));
        s.saves = s.saves.saturating_add(u32::from(p.save));
    }
    s.innings_pitched = InningsPitched::from_thirds(thirds);
    s.era = Era::new(s.earned_runs, thirds, regulation_innings);
    s.whip = Whip::new(s.walks.saturating_add(s.hits), thirds);
    s
}
