use serde::{Deserialize, Serialize};

use crate::model::TBC;

/// Which team-name element a challenger marker belongs to.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChallengerAnchor {
    /// The nearest team name before the marker in document order.
    #[default]
    Preceding,
    /// The nearest team name whose container also holds the marker.
    /// Falls back to [`ChallengerAnchor::Preceding`].
    Enclosing,
}

/// CSS selectors tagging the roles of elements inside a results cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleSelectors {
    pub team_name: String,
    pub team_location: String,
    pub result: String,
    pub ends: String,
    pub challenger_marker: String,
}

impl Default for RoleSelectors {
    fn default() -> Self {
        Self {
            team_name: ".team-name".to_string(),
            team_location: ".team-location".to_string(),
            result: ".result".to_string(),
            ends: ".ends".to_string(),
            challenger_marker: ".challenger-marker".to_string(),
        }
    }
}

/// Settings for [`MatchupParser`](crate::MatchupParser).
///
/// Every field has a default, so a partial config deserializes:
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use bowls_matchup::{ChallengerAnchor, MatchupParser, ParserConfig};
///
/// let config = ParserConfig {
///     anchor: ChallengerAnchor::Enclosing,
///     ..ParserConfig::default()
/// };
/// let parser = MatchupParser::with_config(config)?;
/// let record = parser.parse("Smith (Anytown)(Challenger) V Jones (Elmfield)");
/// assert_eq!(record.challenger, "Smith");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub selectors: RoleSelectors,
    pub anchor: ChallengerAnchor,
    /// Team name the site shows before a fixture's sides are drawn.
    pub placeholder: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            selectors: RoleSelectors::default(),
            anchor: ChallengerAnchor::default(),
            placeholder: TBC.to_string(),
        }
    }
}
