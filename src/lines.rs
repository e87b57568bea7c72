use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Error, Result};
use bounded_integer::BoundedU8;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Serialize, Serializer};

/// Outs recorded in an unfinished inning.
pub type PartialOuts = BoundedU8<0, 2>;

/// Innings pitched in the scorebook's mixed radix: `4.1` is four innings and one out.
/// The digit after the point counts outs, never tenths.
#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash)]
pub struct InningsPitched {
    whole: u32,
    outs: PartialOuts,
}

impl InningsPitched {
    pub fn from_thirds(thirds: u32) -> Self {
        Self {
            whole: thirds / 3,
            outs: PartialOuts::new((thirds % 3) as u8).unwrap_or(PartialOuts::MIN),
        }
    }

    /// `from_thirds` is the only constructor, so `whole * 3 + outs` never exceeds
    /// the thirds it was built from.
    pub fn thirds(self) -> u32 {
        self.whole * 3 + u32::from(self.outs.get())
    }

    /// Lenient reading of an attribute value. Empty or unreadable text is zero;
    /// an out digit above 2 is carried into whole innings.
    pub fn coerce(value: Option<&str>) -> Self {
        value
            .and_then(|s| Self::from_str(s.trim()).ok())
            .unwrap_or_default()
    }

    /// Storage form, always with the out digit.
    fn to_stored(self) -> String {
        format!("{}.{}", self.whole, self.outs.get())
    }
}

impl Default for InningsPitched {
    fn default() -> Self {
        Self::from_thirds(0)
    }
}

impl FromStr for InningsPitched {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (whole, fraction) = s.split_once('.').unwrap_or((s, ""));
        let whole = if whole.is_empty() {
            0
        } else {
            whole.parse::<u32>().context("Bad whole innings value")?
        };
        let outs = match fraction.chars().next() {
            None => 0,
            Some(c) => c.to_digit(10).context("Bad partial innings digit")?,
        };
        if fraction.chars().skip(1).any(|c| c != '0') {
            bail!("Innings pitched has more than one partial digit: {s}")
        }
        let thirds = whole
            .checked_mul(3)
            .and_then(|t| t.checked_add(outs))
            .with_context(|| format!("Innings pitched out of range: {s}"))?;
        Ok(Self::from_thirds(thirds))
    }
}

impl fmt::Display for InningsPitched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outs.get() {
            0 => write!(f, "{}", self.whole),
            o => write!(f, "{}.{}", self.whole, o),
        }
    }
}

impl Serialize for InningsPitched {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl ToSql for InningsPitched {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_stored()))
    }
}

impl FromSql for InningsPitched {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Self::from_str(s).map_err(|e| FromSqlError::Other(e.into()))
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Default, Serialize)]
pub struct BattingCounts {
    pub at_bats: u32,
    pub runs: u32,
    pub hits: u32,
    pub rbi: u32,
    pub doubles: u32,
    pub triples: u32,
    pub home_runs: u32,
    pub walks: u32,
    pub strikeouts: u32,
    pub stolen_bases: u32,
    pub caught_stealing: u32,
    pub hit_by_pitch: u32,
    pub sacrifice_hits: u32,
    pub sacrifice_flies: u32,
    pub grounded_into_double_plays: u32,
    pub intentional_walks: u32,
    pub ground_outs: u32,
    pub fly_outs: u32,
    pub strikeouts_looking: u32,
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Default, Serialize)]
pub struct PitchingCounts {
    pub appearances: u32,
    pub games_started: u32,
    pub innings_pitched: InningsPitched,
    pub at_bats: u32,
    pub hits: u32,
    pub runs: u32,
    pub earned_runs: u32,
    pub walks: u32,
    pub strikeouts: u32,
    pub home_runs: u32,
    pub doubles: u32,
    pub triples: u32,
    pub hit_by_pitch: u32,
    pub batters_faced: u32,
    pub wild_pitches: u32,
    pub balks: u32,
    pub intentional_walks: u32,
    pub fly_outs: u32,
    pub ground_outs: u32,
    pub strikeouts_looking: u32,
    pub pitches: u32,
    pub strikes: u32,
    pub complete_games: u32,
    pub shutouts: u32,
    pub win: bool,
    pub loss: bool,
    pub save: bool,
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Default, Serialize)]
pub struct FieldingCounts {
    pub putouts: u32,
    pub assists: u32,
    pub errors: u32,
    pub passed_balls: u32,
    pub catchers_interference: u32,
    pub stolen_bases_against: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> InningsPitched {
        InningsPitched::from_str(s).unwrap()
    }

    #[test]
    fn mixed_radix_parsing() {
        assert_eq!(ip("4.1").thirds(), 13);
        assert_eq!(ip("3.2").thirds(), 11);
        assert_eq!(ip("5").thirds(), 15);
        assert_eq!(ip("5.0").thirds(), 15);
        assert_eq!(ip(".2").thirds(), 2);
        assert_eq!(ip("0.10").thirds(), 1);
    }

    #[test]
    fn out_digit_above_two_carries() {
        assert_eq!(ip("4.3"), ip("5"));
        assert_eq!(ip("4.4").to_string(), "5.1");
    }

    #[test]
    fn display_omits_zero_outs() {
        assert_eq!(InningsPitched::from_thirds(24).to_string(), "8");
        assert_eq!(InningsPitched::from_thirds(25).to_string(), "8.1");
        assert_eq!(InningsPitched::from_thirds(0).to_string(), "0");
    }

    #[test]
    fn coerce_defaults_to_zero() {
        assert_eq!(InningsPitched::coerce(Some("")).thirds(), 0);
        assert_eq!(InningsPitched::coerce(Some("abc")).thirds(), 0);
        assert_eq!(InningsPitched::coerce(Some("4.15")).thirds(), 0);
        assert_eq!(InningsPitched::coerce(None).thirds(), 0);
        assert_eq!(InningsPitched::coerce(Some(" 2.2 ")).thirds(), 8);
    }

    #[test]
    fn out_of_range_innings_are_rejected() {
        assert!(InningsPitched::from_str("2000000000").is_err());
        assert!(InningsPitched::from_str("1431655765.1").is_err());
        assert_eq!(InningsPitched::coerce(Some("2000000000")).thirds(), 0);

        let widest = ip("1431655765");
        assert_eq!(widest.thirds(), u32::MAX);
        assert_eq!(InningsPitched::from_thirds(u32::MAX).to_string(), "1431655765");
    }
}
