use std::fmt;

use serde::{Serialize, Serializer};

use crate::lines::FieldingCounts;
use crate::stats::{distinct_games, sum};
use crate::store::models::FieldingLine;

/// Fielding percentage. A fielder with no chances is perfect.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct FieldingPct(f64);

impl FieldingPct {
    pub fn new(successful: u32, chances: u32) -> Self {
        if chances == 0 {
            Self(1.0)
        } else {
            Self(f64::from(successful) / f64::from(chances))
        }
    }
}

impl Default for FieldingPct {
    fn default() -> Self {
        Self(1.0)
    }
}

impl fmt::Display for FieldingPct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl Serialize for FieldingPct {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct FieldingSummary {
    pub games: u32,
    #[serde(flatten)]
    pub totals: FieldingCounts,
    pub total_chances: u32,
    pub fpct: FieldingPct,
}

pub fn aggregate_fielding(lines: &[FieldingLine]) -> FieldingSummary {
    let t = lines
        .iter()
        .fold(FieldingCounts::default(), |mut acc, line| {
            let f = &line.stats;
            acc.putouts = acc.putouts.saturating_add(f.putouts);
            acc.assists = acc.assists.saturating_add(f.assists);
            acc.errors = acc.errors.saturating_add(f.errors);
            acc.passed_balls = acc.passed_balls.saturating_add(f.passed_balls);
            acc.catchers_interference = acc.catchers_interference.saturating_add(f.catchers_interference);
            acc.stolen_bases_against = acc.stolen_bases_against.saturating_add(f.stolen_bases_against);
            acc
        });
    let total_chances = sum(&[t.putouts, t.assists, t.errors]);
    FieldingSummary {
        games: distinct_games(lines.iter().map(|l| &l.owner)),
        fpct: FieldingPct::new(t.putouts.saturating_add(t.assists), total_chances),
        total_chances,
        totals: t,
    }
}
