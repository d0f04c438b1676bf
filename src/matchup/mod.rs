//! Extraction of match records from single results-table cells.
//!
//! Two strategies share the [`ParseMatchup`] capability: [`MarkupParser`]
//! reads cells whose elements are tagged by role, and [`TextParser`] works
//! from delimiters in flattened text.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::model::{MatchRecord, Score, Side, NOT_AVAILABLE, UNKNOWN};

mod markup;
mod text;

pub use markup::MarkupParser;
pub use text::TextParser;

/// Marker the site appends to the side that issued the challenge.
pub const CHALLENGER_MARKER: &str = "(Challenger)";
pub(crate) const WALKOVER_TOKEN: &str = "W/O";

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\(\s*challenger\s*\)").expect("valid challenger marker regex")
});
static SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*[-–]\s*(\d+)").expect("valid score regex"));
static ENDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ends\s*:\s*(\d+)").expect("valid ends regex"));

/// Turns one matchup cell into a [`MatchRecord`].
///
/// Implementations never fail: anything they cannot read is reported
/// through sentinel values on the record.
pub trait ParseMatchup {
    fn parse_matchup(&self, input: &str) -> MatchRecord;
}

/// A score found in text, tallies in left-to-right order.
///
/// Tallies too large to read leave [`Score::Invalid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScoreMatch {
    pub span: Range<usize>,
    pub score: Score,
}

pub(crate) fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn has_marker(text: &str) -> bool {
    MARKER_RE.is_match(text)
}

pub(crate) fn strip_marker(text: &str) -> String {
    normalize_ws(&MARKER_RE.replace_all(text, " "))
}

/// Span of the marker if `text` starts with one, ignoring leading whitespace.
pub(crate) fn leading_marker(text: &str) -> Option<Range<usize>> {
    MARKER_RE
        .find(text)
        .filter(|m| text[..m.start()].trim().is_empty())
        .map(|m| m.range())
}

/// Parenthesis depth just before byte offset `pos`.
fn depth_at(text: &str, pos: usize) -> usize {
    text[..pos].chars().fold(0usize, |depth, c| match c {
        '(' => depth + 1,
        ')' => depth.saturating_sub(1),
        _ => depth,
    })
}

/// First `<int> - <int>` that is not inside a club name.
pub(crate) fn find_score(text: &str) -> Option<ScoreMatch> {
    let caps = SCORE_RE
        .captures_iter(text)
        .find(|caps| caps.get(0).is_some_and(|m| depth_at(text, m.start()) == 0))?;
    let span = caps.get(0)?.range();
    let score = match (caps[1].parse(), caps[2].parse()) {
        (Ok(first), Ok(second)) => Score::points(first, second),
        _ => {
            debug!(score = &text[span.clone()], "score tallies out of range");
            Score::Invalid
        }
    };
    Some(ScoreMatch { span, score })
}

pub(crate) fn find_ends(text: &str) -> Option<(Range<usize>, u32)> {
    let caps = ENDS_RE.captures(text)?;
    let ends = caps[1].parse().ok()?;
    Some((caps.get(0)?.range(), ends))
}

/// Drop delimiter tokens left at either edge of a half after splitting.
///
/// A leading `V` followed by a lowercase letter is kept as part of a name.
pub(crate) fn trim_delimiters(text: &str) -> String {
    let mut rest = text.trim();
    loop {
        let before = rest.len();
        if let Some(stripped) = rest.strip_prefix(WALKOVER_TOKEN) {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('V') {
            if !stripped.starts_with(char::is_lowercase) {
                rest = stripped;
            }
        }
        if let Some(stripped) = rest.strip_suffix(WALKOVER_TOKEN) {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_suffix('V') {
            if stripped.is_empty() || stripped.ends_with(|c: char| c == ')' || c == ' ') {
                rest = stripped;
            }
        }
        rest = rest.trim();
        if rest.len() == before {
            break;
        }
    }
    rest.to_string()
}

pub(crate) fn non_empty_or(text: &str, fallback: &str) -> String {
    if text.is_empty() {
        fallback.to_string()
    } else {
        text.to_string()
    }
}

impl Side {
    /// Split `Name (Club)` text, tolerating a challenger marker and stray
    /// delimiters.
    pub(crate) fn from_text(text: &str) -> Self {
        let text = trim_delimiters(&strip_marker(text));
        let Some(open) = text.find('(') else {
            return Side::new(non_empty_or(&text, UNKNOWN), NOT_AVAILABLE);
        };
        let name = text[..open].trim();
        let rest = &text[open + 1..];
        let origin = match rest.rfind(')') {
            Some(close) => rest[..close].trim(),
            None => rest.trim(),
        };
        Side::new(
            non_empty_or(name, UNKNOWN),
            non_empty_or(origin, NOT_AVAILABLE),
        )
    }
}
