use std::borrow::Cow;

use roxmltree::{Document, Node};
use serde::Serialize;
use tracing::debug;

use crate::error::ValidationError;
use crate::game_file::play::{PlayByPlay, PlayRecord};
use crate::game_file::roster::TeamEntry;
use crate::game_file::traits::{child, children, FromElement, Matchup, Side};
use crate::game_file::venue::VenueInfo;
use crate::util::{coerce_yes_no, FlagCoercion};

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default)]
pub struct ParseOptions {
    pub flag_coercion: FlagCoercion,
}

/// Everything one game file says about a game, before any entity is resolved.
#[derive(Debug, Eq, PartialEq, Clone, Serialize)]
pub struct GameFile {
    pub venue: VenueInfo,
    pub is_complete: bool,
    pub teams: Matchup<TeamEntry>,
    pub plays: Vec<PlayRecord>,
}

impl GameFile {
    pub fn parse(bytes: &[u8], options: &ParseOptions) -> Result<Self, ValidationError> {
        let content = decode(bytes);
        let document =
            Document::parse(&content).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        Self::from_root(document.root_element(), options)
    }

    fn from_root(root: Node<'_, '_>, options: &ParseOptions) -> Result<Self, ValidationError> {
        let venue = child(root, "venue").ok_or(ValidationError::MissingVenue)?;
        let venue = VenueInfo::from_element(venue, options)?;
        let is_complete = child(root, "status")
            .map_or(false, |s| coerce_yes_no(s.attribute("complete")));
        let teams = Self::matchup(root, options)?;
        let plays = child(root, "plays")
            .map(|p| PlayByPlay::from_element(p, options))
            .transpose()?
            .unwrap_or_default()
            .0;
        debug!(
            "Parsed game on {} {}: {} at {}, {} plays",
            venue.date,
            venue.start_time,
            teams.away.code,
            teams.home.code,
            plays.len()
        );
        Ok(Self {
            venue,
            is_complete,
            teams,
            plays,
        })
    }

    fn matchup(
        root: Node<'_, '_>,
        options: &ParseOptions,
    ) -> Result<Matchup<TeamEntry>, ValidationError> {
        let nodes = children(root, "team").collect::<Vec<_>>();
        if nodes.len() < 2 {
            return Err(ValidationError::MissingTeams(nodes.len()));
        }
        let mut away = None;
        let mut home = None;
        for node in nodes {
            let team = TeamEntry::from_element(node, options)?;
            let slot = match team.side {
                Side::Away => &mut away,
                Side::Home => &mut home,
            };
            if slot.is_some() {
                return Err(ValidationError::DuplicateSide(team.side));
            }
            *slot = Some(team);
        }
        match (away, home) {
            (Some(away), Some(home)) => Ok(Matchup::new(away, home)),
            (None, _) => Err(ValidationError::DuplicateSide(Side::Home)),
            (_, None) => Err(ValidationError::DuplicateSide(Side::Away)),
        }
    }
}

/// Scoring software writes either UTF-8 or ISO-8859-1. Anything that is not valid UTF-8
/// is read as Latin-1, where every byte maps to the code point of the same value.
fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_file::traits::InningHalf;

    const MINIMAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bsgame>
  <venue date="04/05/2025" start="4:30 PM" location="Springfield" stadium="Memorial Field"
         attend="120" schedinn="7" leaguegame="Y" dhgame="2" weather="Sunny">
    <rules usedh="Y"/>
  </venue>
  <team vh="V" code="AAA" id="T1" name="Visitors">
    <linescore runs="1" hits="4" errs="2" lob="5">
      <lineinn inn="1" score="1"/>
      <lineinn inn="2" score="0"/>
    </linescore>
    <player name="Smith, Jo" shortname="J. Smith" uni="7" playerId="p-7" gp="1" gs="1" spot="1" pos="ss">
      <hitting ab="3" r="1" h="3" double="1" rbi="2"/>
      <fielding po="2" a="3" e="1"/>
    </player>
    <player name="Bench, Al" uni="22" gp="0"/>
  </team>
  <team vh="H" code="BBB" name="Homers">
    <linescore runs="3" hits="6" errs="0" lob="4">
      <lineinn inn="1" score="2"/>
      <lineinn inn="2" score="X"/>
    </linescore>
    <player name="Arm, Ace" uni="1" gp="1" gs="1" spot="9" pos="p">
      <pitching appear="1" gs="1" ip="6.2" h="4" er="1" bb="2" so="9" win="1" loss="N"/>
    </player>
  </team>
  <plays>
    <inning number="1">
      <batting vh="V">
        <play seq="1" outs="0" batter="J. Smith" pitcher="A. Arm">
          <pitches text="BKF"/>
          <narrative text="J. Smith doubled to left center."/>
        </play>
        <play seq="2" outs="0"/>
      </batting>
      <batting vh="H">
        <play seq="1" outs="0">
          <sub who="K. Lee" for="J. Smith" pos="ss" vh="V"/>
        </play>
      </batting>
    </inning>
  </plays>
  <status complete="Y"/>
</bsgame>"#;

    fn parse(xml: &str) -> Result<GameFile, ValidationError> {
        GameFile::parse(xml.as_bytes(), &ParseOptions::default())
    }

    #[test]
    fn reads_venue_and_status() {
        let game = parse(MINIMAL).unwrap();
        assert_eq!(game.venue.date, "04/05/2025");
        assert_eq!(game.venue.start_time, "4:30 PM");
        assert_eq!(game.venue.doubleheader, 2);
        assert_eq!(game.venue.attendance, 120);
        assert_eq!(game.venue.used_dh, "Y");
        assert!(game.venue.is_league_game);
        assert!(game.is_complete);
    }

    #[test]
    fn reads_both_sides() {
        let game = parse(MINIMAL).unwrap();
        let away = &game.teams.away;
        assert_eq!(away.code, "AAA");
        assert_eq!(away.external_id.as_deref(), Some("T1"));
        assert_eq!(game.teams.home.external_id, None);

        let ls = away.line_score.as_ref().unwrap();
        assert_eq!((ls.runs, ls.hits, ls.errors, ls.left_on_base), (1, 4, 2, 5));
        let home_ls = game.teams.home.line_score.as_ref().unwrap();
        assert_eq!(home_ls.innings[1], (2, String::from("X")));
    }

    #[test]
    fn reads_player_lines() {
        let game = parse(MINIMAL).unwrap();
        let smith = &game.teams.away.players[0];
        assert_eq!(smith.short_name, "J. Smith");
        assert_eq!(smith.external_id.as_deref(), Some("p-7"));
        assert!(smith.is_starter());
        let hitting = smith.hitting.unwrap();
        assert_eq!((hitting.at_bats, hitting.hits, hitting.doubles), (3, 3, 1));
        assert_eq!(smith.fielding.unwrap().assists, 3);
        assert!(smith.pitching.is_none());

        let bench = &game.teams.away.players[1];
        assert!(!bench.appeared());
        assert_eq!(bench.short_name, "Bench, Al");

        let arm = game.teams.home.players[0].pitching.unwrap();
        assert_eq!(arm.innings_pitched.thirds(), 20);
        assert!(arm.win);
        assert!(!arm.loss);
        assert!(!arm.save);
    }

    #[test]
    fn presence_coercion_reads_explicit_n_as_set() {
        let options = ParseOptions {
            flag_coercion: FlagCoercion::Presence,
        };
        let game = GameFile::parse(MINIMAL.as_bytes(), &options).unwrap();
        assert!(game.teams.home.players[0].pitching.unwrap().loss);
    }

    #[test]
    fn plays_drop_empty_and_narrate_substitutions() {
        let game = parse(MINIMAL).unwrap();
        assert_eq!(game.plays.len(), 2);
        assert_eq!(game.plays[0].half, InningHalf::Top);
        assert_eq!(game.plays[0].pitch_sequence, "BKF");
        assert_eq!(game.plays[1].half, InningHalf::Bottom);
        assert_eq!(game.plays[1].narrative, "K. Lee to ss for J. Smith.");
    }

    #[test]
    fn missing_venue_is_rejected() {
        let err = parse("<bsgame><team vh=\"V\"/><team vh=\"H\"/></bsgame>").unwrap_err();
        assert!(matches!(err, ValidationError::MissingVenue));
    }

    #[test]
    fn one_team_is_rejected() {
        let err = parse("<bsgame><venue date=\"1\"/><team vh=\"V\"/></bsgame>").unwrap_err();
        assert!(matches!(err, ValidationError::MissingTeams(1)));
    }

    #[test]
    fn unclassifiable_side_is_rejected() {
        let err = parse("<bsgame><venue/><team vh=\"V\"/><team vh=\"X\" code=\"Q\"/></bsgame>")
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnknownSide { .. }));

        let err = parse("<bsgame><venue/><team vh=\"V\"/><team vh=\"V\"/></bsgame>").unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateSide(Side::Away)));
    }

    #[test]
    fn player_listed_twice_is_rejected() {
        let xml = r#"<bsgame><venue/>
  <team vh="V" code="AAA">
    <player name="Twin, Al" uni="4" gp="1"><hitting ab="3"/></player>
    <player name="Twin, Al" uni="4" gp="1"><hitting ab="1"/></player>
  </team>
  <team vh="H" code="BBB"/>
</bsgame>"#;
        let err = parse(xml).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::DuplicatePlayer { ref code, ref name, .. }
                if code == "AAA" && name == "Twin, Al"
        ));

        // A second listing that never appeared is only a roster mention.
        let benched = xml.replace(
            r#"gp="1"><hitting ab="1"/>"#,
            r#"gp="0"><hitting ab="1"/>"#,
        );
        assert!(parse(&benched).is_ok());
    }

    #[test]
    fn malformed_xml_is_rejected() {
        assert!(matches!(
            parse("<bsgame><venue>").unwrap_err(),
            ValidationError::Malformed(_)
        ));
    }

    #[test]
    fn latin1_is_decoded() {
        let mut bytes = b"<bsgame><venue stadium=\"".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"\"/><team vh=\"V\"/><team vh=\"H\"/></bsgame>");
        let game = GameFile::parse(&bytes, &ParseOptions::default()).unwrap();
        assert_eq!(game.venue.stadium, "\u{e9}");
    }
}
