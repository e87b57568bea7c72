use serde::Serialize;

use crate::lines::BattingCounts;
use crate::stats::{distinct_games, sum};
use crate::stats::rate::Rate;
use crate::store::models::BattingLine;

#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct BattingSummary {
    pub games: u32,
    #[serde(flatten)]
    pub totals: BattingCounts,
    pub singles: u32,
    pub total_bases: u32,
    pub avg: Rate,
    pub obp: Rate,
    pub slg: Rate,
    pub ops: Rate,
}

fn add(acc: &mut BattingCounts, line: &BattingCounts) {
    acc.at_bats = acc.at_bats.saturating_add(line.at_bats);
    acc.runs = acc.runs.saturating_add(line.runs);
    acc.hits = acc.hits.saturating_add(line.hits);
    acc.rbi = acc.rbi.saturating_add(line.rbi);
    acc.doubles = acc.doubles.saturating_add(line.doubles);
    acc.triples = acc.triples.saturating_add(line.triples);
    acc.home_runs = acc.home_runs.saturating_add(line.home_runs);
    acc.walks = acc.walks.saturating_add(line.walks);
    acc.strikeouts = acc.strikeouts.saturating_add(line.strikeouts);
    acc.stolen_bases = acc.stolen_bases.saturating_add(line.stolen_bases);
    acc.caught_stealing = acc.caught_stealing.saturating_add(line.caught_stealing);
    acc.hit_by_pitch = acc.hit_by_pitch.saturating_add(line.hit_by_pitch);
    acc.sacrifice_hits = acc.sacrifice_hits.saturating_add(line.sacrifice_hits);
    acc.sacrifice_flies = acc.sacrifice_flies.saturating_add(line.sacrifice_flies);
    acc.grounded_into_double_plays = acc.grounded_into_double_plays.saturating_add(line.grounded_into_double_plays);
    acc.intentional_walks = acc.intentional_walks.saturating_add(line.intentional_walks);
    acc.ground_outs = acc.ground_outs.saturating_add(line.ground_outs);
    acc.fly_outs = acc.fly_outs.saturating_add(line.fly_outs);
    acc.strikeouts_looking = acc.strikeouts_looking.saturating_add(line.strikeouts_looking);
}

pub fn aggregate_batting(lines: &[BattingLine]) -> BattingSummary {
    let mut t = BattingCounts::default();
    for line in lines {
        add(&mut t, &line.stats);
    }
    // Scorer error can make extra-base hits exceed hits; never go below zero.
    let singles = t.hits.saturating_sub(sum(&[t.doubles, t.triples, t.home_runs]));
    let total_bases = sum(&[
        singles,
        t.doubles.saturating_mul(2),
        t.triples.saturating_mul(3),
        t.home_runs.saturating_mul(4),
    ]);

    let on_base = sum(&[t.hits, t.walks, t.hit_by_pitch]);
    let obp = Rate::new(
        on_base,
        sum(&[t.at_bats, t.walks, t.hit_by_pitch, t.sacrifice_flies]),
    );
    let slg = Rate::new(total_bases, t.at_bats);
    BattingSummary {
        games: distinct_games(lines.iter().map(|l| &l.owner)),
        avg: Rate::new(t.hits, t.at_bats),
        ops: Rate::defined(obp.or_zero() + slg.or_zero()),
        obp,
        slg,
        singles,
        total_bases,
        totals: t,
    }
}
