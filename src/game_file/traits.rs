use roxmltree::Node;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::error::ValidationError;
use crate::game_file::parser::ParseOptions;

pub type Inning = u32;

#[derive(Debug, Eq, PartialEq, EnumString, Display, Hash, Copy, Clone, Serialize, Deserialize)]
pub enum Side {
    #[strum(serialize = "V")]
    #[strum(to_string = "visitor")]
    Away,
    #[strum(serialize = "H")]
    #[strum(to_string = "home")]
    Home,
}

#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Display, AsRefStr, Hash, Copy, Clone, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InningHalf {
    Top,
    Bottom,
}

impl InningHalf {
    /// Visitors bat in the top half; any other batting side is read as the bottom.
    pub fn from_batting_side(vh: Option<&str>) -> Self {
        match vh.map(str::trim) {
            Some("V") => Self::Top,
            _ => Self::Bottom,
        }
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize)]
pub struct Matchup<T> {
    pub away: T,
    pub home: T,
}

impl<T> Matchup<T> {
    pub const fn new(away: T, home: T) -> Self {
        Self { away, home }
    }

    pub const fn get(&self, side: Side) -> &T {
        match side {
            Side::Away => &self.away,
            Side::Home => &self.home,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        [(Side::Away, &self.away), (Side::Home, &self.home)].into_iter()
    }
}

pub trait FromElement {
    fn from_element(node: Node<'_, '_>, options: &ParseOptions) -> Result<Self, ValidationError>
    where
        Self: Sized;
}

/// First direct child with the given tag name.
pub fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

/// All direct children with the given tag name, in document order.
pub fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |n| n.has_tag_name(tag))
}
