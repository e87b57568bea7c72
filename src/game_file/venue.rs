use roxmltree::Node;
use serde::Serialize;

use crate::error::ValidationError;
use crate::game_file::parser::ParseOptions;
use crate::game_file::traits::{child, FromElement};
use crate::util::{coerce_int, coerce_yes_no, text};

const DEFAULT_SCHEDULED_INNINGS: u32 = 7;

/// Contents of the `venue` block: when and where the game was played.
#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize)]
pub struct VenueInfo {
    pub date: String,
    pub start_time: String,
    /// 0 for a single game, otherwise the game's number within the doubleheader.
    pub doubleheader: u32,
    pub location: String,
    pub stadium: String,
    pub duration: String,
    pub attendance: u32,
    pub scheduled_innings: u32,
    pub weather: String,
    pub is_league_game: bool,
    pub used_dh: String,
}

impl FromElement for VenueInfo {
    fn from_element(node: Node<'_, '_>, _options: &ParseOptions) -> Result<Self, ValidationError> {
        let a = |name: &str| node.attribute(name);
        let used_dh = child(node, "rules")
            .and_then(|r| r.attribute("usedh"))
            .map_or_else(|| String::from("N"), |v| text(Some(v)));
        Ok(Self {
            date: text(a("date")),
            start_time: text(a("start")),
            doubleheader: coerce_int(a("dhgame"), 0),
            location: text(a("location")),
            stadium: text(a("stadium")),
            duration: text(a("duration")),
            attendance: coerce_int(a("attend"), 0),
            scheduled_innings: coerce_int(a("schedinn"), DEFAULT_SCHEDULED_INNINGS),
            weather: text(a("weather")),
            is_league_game: coerce_yes_no(a("leaguegame")),
            used_dh,
        })
    }
}
