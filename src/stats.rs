//! Season-to-date totals and rate statistics over stored per-game lines.
//!
//! Every aggregator is a pure function over a slice and never fails: empty input
//! yields zero counts and the defined display value for each rate.

pub mod batting;
pub mod fielding;
pub mod pitching;
pub mod rate;

use itertools::Itertools;

use crate::store::models::LineOwner;

pub use batting::{aggregate_batting, BattingSummary};
pub use fielding::{aggregate_fielding, FieldingSummary};
pub use pitching::{aggregate_pitching, Era, PitchingSummary};
pub use rate::Rate;

/// Number of distinct games among the owners of a set of lines.
fn distinct_games<'a>(owners: impl Iterator<Item = &'a LineOwner>) -> u32 {
    let count = owners.map(|o| o.game_id).unique().count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Saturating sum, so that absurd counts in a file pin at the maximum instead of wrapping.
fn sum(values: &[u32]) -> u32 {
    values.iter().fold(0, |acc, v| acc.saturating_add(*v))
}
