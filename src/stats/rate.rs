use std::fmt;

use serde::{Serialize, Serializer};

/// A ratio shown to three decimals. With a zero denominator there is no value and it
/// displays as `.000`.
#[derive(Debug, PartialEq, Copy, Clone, Default)]
pub struct Rate(Option<f64>);

impl Rate {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        if denominator == 0 {
            Self(None)
        } else {
            Self(Some(f64::from(numerator) / f64::from(denominator)))
        }
    }

    /// A rate that is always defined, for sums of rates such as OPS.
    pub fn defined(value: f64) -> Self {
        Self(Some(value))
    }

    /// Numeric value for sorting and adding, with an undefined rate as zero.
    pub fn or_zero(self) -> f64 {
        self.0.unwrap_or(0.0)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v:.3}"),
            None => f.write_str(".000"),
        }
    }
}

impl Serialize for Rate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_decimals() {
        assert_eq!(Rate::new(1, 3).to_string(), "0.333");
        assert_eq!(Rate::new(4, 3).to_string(), "1.333");
        assert_eq!(Rate::new(3, 3).to_string(), "1.000");
    }

    #[test]
    fn zero_denominator() {
        assert_eq!(Rate::new(0, 0).to_string(), ".000");
        assert_eq!(Rate::new(5, 0), Rate::default());
        assert_eq!(Rate::defined(0.0).to_string(), "0.000");
    }

    #[test]
    fn serializes_as_display() {
        assert_eq!(serde_json::to_string(&Rate::new(1, 4)).unwrap(), "\"0.250\"");
    }
}
