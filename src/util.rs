use std::str::FromStr;

use num_traits::PrimInt;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// How win/loss/save attributes on a pitching line are turned into booleans.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum FlagCoercion {
    /// Any present, non-empty value is true, including an explicit "N".
    /// Matches data imported by earlier tooling.
    Presence,
    /// The value is read: empty, "N", "NO", "F", "FALSE" and zero are false.
    #[default]
    Textual,
}

const FALSE_STRINGS: [&str; 4] = ["N", "NO", "F", "FALSE"];

pub fn coerce_int<T: PrimInt + FromStr>(value: Option<&str>, default: T) -> T {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

pub fn coerce_float(value: Option<&str>, default: f64) -> f64 {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|f| f.is_finite())
        .unwrap_or(default)
}

/// True only for a case-insensitive "Y".
pub fn coerce_yes_no(value: Option<&str>) -> bool {
    value.map_or(false, |s| s.trim().eq_ignore_ascii_case("Y"))
}

pub fn coerce_flag(value: Option<&str>, mode: FlagCoercion) -> bool {
    let Some(value) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return false;
    };
    match mode {
        FlagCoercion::Presence => true,
        FlagCoercion::Textual => {
            if let Ok(i) = value.parse::<i64>() {
                return i != 0;
            }
            !FALSE_STRINGS.iter().any(|f| value.eq_ignore_ascii_case(f))
        }
    }
}

/// Attribute text with surrounding whitespace removed, empty when absent.
pub fn text(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

/// Like `text`, but absent and blank both become `None`.
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_defaults_on_bad_input() {
        assert_eq!(coerce_int::<u32>(Some("12"), 0), 12);
        assert_eq!(coerce_int::<u32>(Some(" 7 "), 0), 7);
        assert_eq!(coerce_int::<u32>(Some(""), 0), 0);
        assert_eq!(coerce_int::<u32>(None, 7), 7);
        assert_eq!(coerce_int::<u32>(Some("abc"), 3), 3);
        assert_eq!(coerce_int::<u32>(Some("-1"), 0), 0);
        assert_eq!(coerce_int::<i32>(Some("-1"), 0), -1);
    }

    #[test]
    fn float_defaults_on_bad_input() {
        assert!((coerce_float(Some("4.1"), 0.0) - 4.1).abs() < f64::EPSILON);
        assert!(coerce_float(Some("x"), 0.0).abs() < f64::EPSILON);
        assert!(coerce_float(None, 0.0).abs() < f64::EPSILON);
        assert!(coerce_float(Some("NaN"), 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn yes_no_requires_exact_y() {
        assert!(coerce_yes_no(Some("Y")));
        assert!(coerce_yes_no(Some("y")));
        assert!(!coerce_yes_no(Some("Yes")));
        assert!(!coerce_yes_no(Some("N")));
        assert!(!coerce_yes_no(None));
    }

    #[test]
    fn presence_flag_reads_n_as_true() {
        assert!(coerce_flag(Some("N"), FlagCoercion::Presence));
        assert!(coerce_flag(Some("1"), FlagCoercion::Presence));
        assert!(!coerce_flag(Some(""), FlagCoercion::Presence));
        assert!(!coerce_flag(None, FlagCoercion::Presence));
    }

    #[test]
    fn textual_flag_reads_value() {
        assert!(!coerce_flag(Some("N"), FlagCoercion::Textual));
        assert!(!coerce_flag(Some("0"), FlagCoercion::Textual));
        assert!(!coerce_flag(Some("false"), FlagCoercion::Textual));
        assert!(coerce_flag(Some("1"), FlagCoercion::Textual));
        assert!(coerce_flag(Some("Y"), FlagCoercion::Textual));
        assert!(coerce_flag(Some("W"), FlagCoercion::Textual));
        assert!(!coerce_flag(None, FlagCoercion::Textual));
    }
}
