use std::sync::LazyLock;

use itertools::Itertools;
use rayon::prelude::*;
use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::config::ParserConfig;
use crate::error::Result;
use crate::matchup::{MarkupParser, ParseMatchup, TextParser};
use crate::model::{MatchRecord, MatchStatus, RoundResults};
use crate::source::MatchupSource;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][^<>]*>").expect("valid html tag regex"));

/// The representation a matchup cell arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum InputShape {
    Text,
    Markup,
}

impl InputShape {
    /// Markup if the input contains at least one HTML tag.
    pub fn detect(raw: &str) -> Self {
        if TAG_RE.is_match(raw) {
            InputShape::Markup
        } else {
            InputShape::Text
        }
    }
}

/// The main entry point for turning results-table cells into records.
///
/// Holds the compiled role selectors; cheap to share between threads.
///
/// # Examples
///
/// ```
/// use bowls_matchup::{MatchupParser, Score};
///
/// let parser = MatchupParser::new();
/// let record = parser.parse("Jones (Elmfield) V Smith (Anytown)(Challenger) 14 - 21");
/// assert_eq!(record.challenger, "Smith");
/// assert_eq!(record.score, Score::points(21, 14));
/// ```
#[derive(Debug, Clone)]
pub struct MatchupParser {
    text: TextParser,
    markup: MarkupParser,
}

impl MatchupParser {
    /// Create a parser with the default role selectors.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
            .unwrap_or_else(|_| unreachable!("default role selectors are valid CSS"))
    }

    /// Create a parser from `config`, failing if a role selector is invalid.
    pub fn with_config(config: ParserConfig) -> Result<Self> {
        Ok(Self {
            text: TextParser,
            markup: MarkupParser::new(&config)?,
        })
    }

    /// Parse one cell, choosing the strategy from the shape of the input.
    pub fn parse(&self, raw: &str) -> MatchRecord {
        self.strategy(InputShape::detect(raw)).parse_matchup(raw)
    }

    /// Parse one cell as already-decoded text.
    pub fn parse_text(&self, raw: &str) -> MatchRecord {
        self.text.parse_matchup(raw)
    }

    /// Parse one cell as a markup fragment.
    pub fn parse_markup(&self, raw: &str) -> MatchRecord {
        self.markup.parse_matchup(raw)
    }

    fn strategy(&self, shape: InputShape) -> &dyn ParseMatchup {
        match shape {
            InputShape::Text => &self.text,
            InputShape::Markup => &self.markup,
        }
    }

    /// Parse every cell of a round, keeping the source row order.
    pub fn parse_round<S: AsRef<str>>(&self, cells: &[S]) -> Vec<MatchRecord> {
        let records = cells
            .iter()
            .map(|cell| self.parse(cell.as_ref()))
            .collect_vec();
        log_round(&records);
        records
    }

    /// Like [`parse_round`](Self::parse_round), spreading cells over the
    /// rayon thread pool.
    pub fn parse_round_parallel<S: AsRef<str> + Sync>(&self, cells: &[S]) -> Vec<MatchRecord> {
        let records: Vec<MatchRecord> = cells
            .par_iter()
            .map(|cell| self.parse(cell.as_ref()))
            .collect();
        log_round(&records);
        records
    }

    /// Fetch a round's cells from `source` and parse them in order.
    #[instrument(skip(self, source))]
    pub async fn load_round<M: MatchupSource>(&self, source: &M, round: &str) -> Result<RoundResults> {
        let cells = source.matchup_cells(round).await?;
        if cells.is_empty() {
            warn!(round, "source returned no matchup cells");
        }
        let records = self.parse_round(&cells);
        debug!(round, count = records.len(), "loaded round");
        Ok(RoundResults {
            round: round.to_owned(),
            records,
        })
    }
}

impl Default for MatchupParser {
    fn default() -> Self {
        Self::new()
    }
}

fn log_round(records: &[MatchRecord]) {
    let counts = records.iter().counts_by(|record| record.status);
    debug!(
        cells = records.len(),
        unparsed = counts.get(&MatchStatus::Unparsed).copied().unwrap_or_default(),
        undetermined = counts.get(&MatchStatus::Undetermined).copied().unwrap_or_default(),
        "parsed matchup cells"
    );
}
