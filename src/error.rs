use std::path::PathBuf;

use thiserror::Error;

use crate::game_file::traits::Side;

/// A game file that cannot be imported as written. Raised before anything is stored.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("document is not well-formed XML: {0}")]
    Malformed(String),
    #[error("no <venue> element found")]
    MissingVenue,
    #[error("expected two <team> elements, found {0}")]
    MissingTeams(usize),
    #[error("team {code:?} has unrecognized side {vh:?}")]
    UnknownSide { code: String, vh: String },
    #[error("more than one team is listed as the {0} side")]
    DuplicateSide(Side),
    #[error("team {code:?} lists {name} #{uniform_number} more than once")]
    DuplicatePlayer {
        code: String,
        name: String,
        uniform_number: String,
    },
    #[error("file is {size} bytes, over the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl ImportError {
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
