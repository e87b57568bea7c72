use roxmltree::Node;
use serde::Serialize;

use crate::error::ValidationError;
use crate::game_file::parser::ParseOptions;
use crate::game_file::traits::{child, children, FromElement, Inning, InningHalf};
use crate::util::{coerce_int, text};

/// A single play-by-play entry, positioned by inning, half and sequence number.
#[derive(Debug, Eq, PartialEq, Clone, Serialize)]
pub struct PlayRecord {
    pub inning: Inning,
    pub half: InningHalf,
    pub sequence: u32,
    pub outs_before: u32,
    pub batter: String,
    pub pitcher: String,
    pub pitch_sequence: String,
    pub narrative: String,
}

impl PlayRecord {
    /// A play with no narrative and no batter says nothing and is not kept.
    pub fn is_informative(&self) -> bool {
        !(self.narrative.is_empty() && self.batter.is_empty())
    }

    fn from_play(
        node: Node<'_, '_>,
        inning: Inning,
        half: InningHalf,
    ) -> Self {
        let a = |name: &str| node.attribute(name);
        let nested_text = |tag: &str| text(child(node, tag).and_then(|n| n.attribute("text")));

        let mut narrative = nested_text("narrative");
        if narrative.is_empty() {
            if let Some(sub) = child(node, "sub") {
                narrative = substitution_narrative(sub);
            }
        }
        Self {
            inning,
            half,
            sequence: coerce_int(a("seq"), 0),
            outs_before: coerce_int(a("outs"), 0),
            batter: text(a("batter")),
            pitcher: text(a("pitcher")),
            pitch_sequence: nested_text("pitches"),
            narrative,
        }
    }
}

fn substitution_narrative(sub: Node<'_, '_>) -> String {
    let a = |name: &str| text(sub.attribute(name));
    format!("{} to {} for {}.", a("who"), a("pos"), a("for"))
}

/// The `plays` section flattened into document order.
#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize)]
pub struct PlayByPlay(pub Vec<PlayRecord>);

impl FromElement for PlayByPlay {
    fn from_element(node: Node<'_, '_>, _options: &ParseOptions) -> Result<Self, ValidationError> {
        let mut plays = vec![];
        for inning_node in children(node, "inning") {
            let inning = coerce_int(inning_node.attribute("number"), 0);
            for batting in children(inning_node, "batting") {
                let half = InningHalf::from_batting_side(batting.attribute("vh"));
                plays.extend(
                    children(batting, "play")
                        .map(|p| PlayRecord::from_play(p, inning, half))
                        .filter(PlayRecord::is_informative),
                );
            }
        }
        Ok(Self(plays))
    }
}
