//! Parse matchup cells from bowls competition results tables into
//! [`MatchRecord`]s: challenger, opponent, their clubs, a challenger-first
//! score, and the number of ends played.
//!
//! Parsing never fails. Cells that cannot be read come back with sentinel
//! values (`"Unknown"`, `"N/A"`, `"Invalid"`, `"No Score"`) and a
//! [`MatchStatus`] saying why.
//!
//! ```
//! let record = bowls_matchup::parse("BYE(Challenger)Smith (Anytown)");
//! assert_eq!(record.challenger, "BYE");
//! assert_eq!(record.opponent, "Smith");
//! assert_eq!(record.score.to_string(), "No Score");
//! ```

use std::sync::LazyLock;

pub use config::{ChallengerAnchor, ParserConfig, RoleSelectors};
pub use error::{MatchupError, Result};
pub use matchup::{MarkupParser, ParseMatchup, TextParser, CHALLENGER_MARKER};
pub use model::*;
pub use parser::{InputShape, MatchupParser};
pub use source::MatchupSource;

pub mod config;
pub mod error;
pub mod matchup;
pub mod model;
mod parser;
mod source;

static DEFAULT_PARSER: LazyLock<MatchupParser> = LazyLock::new(MatchupParser::new);

/// Parse one cell with the default configuration, detecting its shape.
pub fn parse(raw: &str) -> MatchRecord {
    DEFAULT_PARSER.parse(raw)
}

/// Parse one cell of already-decoded text.
pub fn parse_text(raw: &str) -> MatchRecord {
    DEFAULT_PARSER.parse_text(raw)
}

/// Parse one cell given as a markup fragment.
pub fn parse_markup(raw: &str) -> MatchRecord {
    DEFAULT_PARSER.parse_markup(raw)
}
