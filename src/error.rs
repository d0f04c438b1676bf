use ::scraper::error::SelectorErrorKind;

/// All errors that can occur at the edges of matchup parsing.
///
/// Parsing itself never fails; these come from configuration, explicit
/// score conversion, and injected round sources.
#[derive(thiserror::Error, Debug)]
pub enum MatchupError {
    /// A configured role selector could not be parsed.
    #[error("invalid CSS selector: {0}")]
    Selector(String),

    /// Text that is neither a `"X - Y"` score nor a score sentinel.
    #[error("invalid score text: {0:?}")]
    InvalidScore(String),

    /// A [`MatchupSource`](crate::MatchupSource) failed to supply cells.
    #[error("failed to load matchup cells for round {round}: {source}")]
    Source {
        round: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl MatchupError {
    /// Wrap an error raised by a round source.
    pub fn source_failed<E>(round: &str, err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        MatchupError::Source {
            round: round.to_owned(),
            source: err.into(),
        }
    }
}

impl<'a> From<SelectorErrorKind<'a>> for MatchupError {
    fn from(err: SelectorErrorKind<'a>) -> Self {
        MatchupError::Selector(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MatchupError>;
