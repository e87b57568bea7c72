pub mod parser;
pub mod play;
pub mod roster;
pub mod traits;
pub mod venue;

pub use parser::{GameFile, ParseOptions};
