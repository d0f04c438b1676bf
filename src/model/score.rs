use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::MatchupError;

/// The result of a fixture, oriented challenger first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Score {
    Points { challenger: u32, opponent: u32 },
    NoScore,
    Walkover,
    Invalid,
}

impl Score {
    pub fn points(challenger: u32, opponent: u32) -> Self {
        Score::Points {
            challenger,
            opponent,
        }
    }

    /// Swap the two tallies. Sentinels are returned unchanged.
    pub fn reversed(self) -> Self {
        match self {
            Score::Points {
                challenger,
                opponent,
            } => Score::points(opponent, challenger),
            other => other,
        }
    }

    pub fn is_points(&self) -> bool {
        matches!(self, Score::Points { .. })
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Score::Points {
                challenger,
                opponent,
            } => write!(f, "{challenger} - {opponent}"),
            Score::NoScore => write!(f, "No Score"),
            Score::Walkover => write!(f, "Walkover"),
            Score::Invalid => write!(f, "Invalid"),
        }
    }
}

impl FromStr for Score {
    type Err = MatchupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed {
            "No Score" => return Ok(Score::NoScore),
            "Walkover" => return Ok(Score::Walkover),
            "Invalid" => return Ok(Score::Invalid),
            _ => {}
        }
        trimmed
            .split_once('-')
            .and_then(|(left, right)| {
                let challenger = left.trim().parse().ok()?;
                let opponent = right.trim().parse().ok()?;
                Some(Score::points(challenger, opponent))
            })
            .ok_or_else(|| MatchupError::InvalidScore(s.to_owned()))
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
