use std::future::Future;

use crate::error::Result;

/// Supplies the raw matchup cells of a round, top to bottom.
///
/// Retrieval (HTTP, cached pages, fixture files) lives behind this trait so
/// that parsing stays free of I/O. Cells may be plain text or markup
/// fragments; [`MatchupParser::load_round`](crate::MatchupParser::load_round)
/// detects the shape of each one. Implementations wrap their own failures
/// with [`MatchupError::source_failed`](crate::MatchupError::source_failed).
pub trait MatchupSource {
    fn matchup_cells(&self, round: &str) -> impl Future<Output = Result<Vec<String>>> + Send;
}
