#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::cargo)]
#![warn(
    clippy::nursery,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate
)]

pub mod error;
pub mod game_file;
pub mod import;
pub mod lines;
pub mod report;
pub mod season;
pub mod stats;
pub mod store;
pub mod util;

pub use error::{ImportError, ValidationError};
pub use import::{import_batch, import_file, import_paths, BatchReport, FileReport, ImportOptions};
pub use store::games::ImportOutcome;
pub use store::Store;
