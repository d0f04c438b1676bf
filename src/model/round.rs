use serde::Serialize;

use super::{MatchRecord, MatchStatus, HEADERS};

/// The parsed fixtures of one round, in the order the site lists them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundResults {
    pub round: String,
    pub records: Vec<MatchRecord>,
}

impl RoundResults {
    pub fn headers() -> &'static [&'static str] {
        &HEADERS
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        self.records.iter().map(MatchRecord::to_row).collect()
    }

    /// Number of records that fell back to sentinel names.
    pub fn unparsed_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.status == MatchStatus::Unparsed)
            .count()
    }
}
