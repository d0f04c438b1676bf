use serde::{Serialize, Serializer};

use super::Score;

/// Placeholder for a name or club that could not be extracted.
pub const UNKNOWN: &str = "Unknown";
/// Placeholder for a field that does not apply to the fixture.
pub const NOT_AVAILABLE: &str = "N/A";
/// The side of a bye round that has no real participant.
pub const BYE: &str = "BYE";
/// The site's placeholder for a team that is not yet known.
pub const TBC: &str = "TBC";

/// Column headers matching [`MatchRecord::to_row`].
pub const HEADERS: [&str; 6] = [
    "Challenger",
    "From(Challenger)",
    "Opponent",
    "From(Opponent)",
    "Score",
    "Ends",
];

/// How a matchup cell was classified.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Played,
    Scheduled,
    Bye,
    Walkover,
    /// Only one side could be identified.
    Partial,
    /// The draw has not reached this fixture yet (all teams `TBC`).
    Undetermined,
    /// No delimiter between the two sides was found.
    Unparsed,
}

/// A single fixture extracted from a matchup cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    #[serde(rename = "Challenger")]
    pub challenger: String,
    #[serde(rename = "From(Challenger)")]
    pub challenger_origin: String,
    #[serde(rename = "Opponent")]
    pub opponent: String,
    #[serde(rename = "From(Opponent)")]
    pub opponent_origin: String,
    #[serde(rename = "Score")]
    pub score: Score,
    #[serde(rename = "Ends", serialize_with = "serialize_ends")]
    pub ends: Option<u32>,
    #[serde(rename = "Status")]
    pub status: MatchStatus,
}

/// One team as it appears in a matchup: a name and the club it plays from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Side {
    pub name: String,
    pub origin: String,
}

impl Side {
    pub fn new(name: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: origin.into(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN, UNKNOWN)
    }

    pub fn bye() -> Self {
        Self::new(BYE, NOT_AVAILABLE)
    }

    pub fn is_bye(&self) -> bool {
        self.name == BYE
    }
}

impl MatchRecord {
    pub(crate) fn new(
        challenger: Side,
        opponent: Side,
        score: Score,
        ends: Option<u32>,
        status: MatchStatus,
    ) -> Self {
        Self {
            challenger: challenger.name,
            challenger_origin: challenger.origin,
            opponent: opponent.name,
            opponent_origin: opponent.origin,
            score,
            ends,
            status,
        }
    }

    /// A bye: `named` is the only real participant.
    pub(crate) fn bye(named: Side, bye_is_challenger: bool) -> Self {
        let (challenger, opponent) = if bye_is_challenger {
            (Side::bye(), named)
        } else {
            (named, Side::bye())
        };
        Self::new(challenger, opponent, Score::NoScore, None, MatchStatus::Bye)
    }

    pub(crate) fn walkover(challenger: Side, opponent: Side) -> Self {
        Self::new(
            challenger,
            opponent,
            Score::Walkover,
            None,
            MatchStatus::Walkover,
        )
    }

    /// A fixture whose teams are still placeholders.
    pub(crate) fn undetermined(placeholder: &str) -> Self {
        let side = Side::new(placeholder, NOT_AVAILABLE);
        Self::new(
            side.clone(),
            side,
            Score::NoScore,
            None,
            MatchStatus::Undetermined,
        )
    }

    /// Sides could not be told apart; keep whatever score and ends were read.
    pub(crate) fn unparsed(score: Option<Score>, ends: Option<u32>) -> Self {
        Self::new(
            Side::unknown(),
            Side::unknown(),
            score.unwrap_or(Score::Invalid),
            ends,
            MatchStatus::Unparsed,
        )
    }

    /// `"N/A"` when the number of ends was not reported.
    pub fn ends_text(&self) -> String {
        self.ends
            .map(|ends| ends.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// The record as display cells, in [`HEADERS`] order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.challenger.clone(),
            self.challenger_origin.clone(),
            self.opponent.clone(),
            self.opponent_origin.clone(),
            self.score.to_string(),
            self.ends_text(),
        ]
    }
}

fn serialize_ends<S: Serializer>(ends: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
    match ends {
        Some(ends) => serializer.collect_str(ends),
        None => serializer.serialize_str(NOT_AVAILABLE),
    }
}
