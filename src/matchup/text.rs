use std::ops::Range;

use tracing::debug;

use super::{
    find_ends, find_score, has_marker, leading_marker, normalize_ws, strip_marker,
    trim_delimiters, ParseMatchup, WALKOVER_TOKEN,
};
use crate::model::{MatchRecord, MatchStatus, Score, Side, BYE};

/// Reads a matchup from flattened cell text by sniffing delimiters.
///
/// Classification is checked in priority order: bye, walkover, then a
/// normal fixture split at its score, a bare `V`, or nothing (unparsed).
#[derive(Debug, Default, Clone, Copy)]
pub struct TextParser;

impl ParseMatchup for TextParser {
    fn parse_matchup(&self, input: &str) -> MatchRecord {
        parse_text(input)
    }
}

pub(crate) fn parse_text(raw: &str) -> MatchRecord {
    let text = normalize_ws(raw);
    if let Some(bye) = find_bye(&text) {
        return parse_bye(&text, bye);
    }
    if let Some(pos) = text.find(WALKOVER_TOKEN) {
        let first = remove_ends(&text[..pos]).0;
        let second = remove_ends(&text[pos + WALKOVER_TOKEN.len()..]).0;
        let (challenger, opponent) = orient(&first, &second).0;
        return MatchRecord::walkover(challenger, opponent);
    }
    parse_fixture(&text)
}

/// `BYE` as a token of its own; a delimiter `V` may be glued to its front.
fn find_bye(text: &str) -> Option<Range<usize>> {
    text.match_indices(BYE)
        .map(|(pos, _)| pos..pos + BYE.len())
        .find(|span| {
            let mut before = text[..span.start].chars().rev();
            let prev_ok = match before.next() {
                None => true,
                Some('V') => !before.next().is_some_and(char::is_alphabetic),
                Some(c) => !c.is_alphabetic(),
            };
            let next = text[span.end..].chars().next();
            prev_ok && !next.is_some_and(char::is_alphabetic)
        })
}

fn parse_bye(text: &str, bye: Range<usize>) -> MatchRecord {
    let before = &text[..bye.start];
    let mut after = &text[bye.end..];
    let bye_is_challenger = match leading_marker(after) {
        Some(marker) => {
            after = &after[marker.end..];
            true
        }
        None => false,
    };
    let named = [before, after]
        .into_iter()
        .find(|half| !trim_delimiters(&strip_marker(half)).is_empty())
        .map(Side::from_text)
        .unwrap_or_else(Side::unknown);
    MatchRecord::bye(named, bye_is_challenger)
}

/// Pick the challenger between two halves of a matchup.
///
/// Returns `(challenger, opponent)` and whether the challenger was the
/// first half. Unmarked halves fall back to the second half as challenger.
fn orient(first: &str, second: &str) -> ((Side, Side), bool) {
    let challenger_first = match (has_marker(first), has_marker(second)) {
        (true, _) => true,
        (false, true) => false,
        (false, false) => {
            debug!(first, second, "no challenger marker, using positional fallback");
            false
        }
    };
    let (first, second) = (Side::from_text(first), Side::from_text(second));
    if challenger_first {
        ((first, second), true)
    } else {
        ((second, first), false)
    }
}

/// Cut an `Ends: N` tally out of `text`.
fn remove_ends(text: &str) -> (String, Option<u32>) {
    match find_ends(text) {
        Some((span, ends)) => {
            let mut rest = text.to_string();
            rest.replace_range(span, " ");
            (rest, Some(ends))
        }
        None => (text.to_string(), None),
    }
}

fn parse_fixture(text: &str) -> MatchRecord {
    let (text, ends) = remove_ends(text);

    // A score at either edge of the text does not separate the sides;
    // drop it and look for a `V` instead.
    let score = find_score(&text);
    let (text, split) = match &score {
        Some(found) if separates_sides(&text, &found.span) => {
            // A `V` glued to the score is the delimiter, whatever follows it.
            let mut split = found.span.clone();
            if text[split.end..].starts_with('V') {
                split.end += 1;
            }
            (text, Some(split))
        }
        Some(found) => {
            let mut rest = text.clone();
            rest.replace_range(found.span.clone(), " ");
            let split = find_versus(&rest);
            (rest, split)
        }
        None => {
            let split = find_versus(&text);
            (text, split)
        }
    };
    let Some(split) = split else {
        debug!(text = %text, "no delimiter between sides");
        let score = score.map(|found| found.score);
        return MatchRecord::unparsed(score, ends);
    };

    let ((challenger, opponent), challenger_first) =
        orient(&text[..split.start], &text[split.end..]);
    let (score, status) = match score {
        Some(found) => {
            let score = if challenger_first {
                found.score
            } else {
                found.score.reversed()
            };
            (score, MatchStatus::Played)
        }
        None => (Score::NoScore, MatchStatus::Scheduled),
    };
    MatchRecord::new(challenger, opponent, score, ends, status)
}

fn separates_sides(text: &str, span: &Range<usize>) -> bool {
    [&text[..span.start], &text[span.end..]]
        .iter()
        .all(|half| !trim_delimiters(&strip_marker(half)).is_empty())
}

/// Position of the `V` separating two sides, outside any parentheses.
///
/// A `V` standing alone between spaces wins. Otherwise a `V` right after a
/// closing club parenthesis splits whatever follows (`)Vde Silva`), and any
/// other `V` splits only when not glued to the letters of a name
/// (`VJones` splits, `Vance` does not).
fn find_versus(text: &str) -> Option<Range<usize>> {
    scan_versus(text, |prev, next| {
        prev.map_or(true, char::is_whitespace) && next.map_or(true, char::is_whitespace)
    })
    .or_else(|| {
        scan_versus(text, |prev, next| {
            prev == Some(')')
                || (!prev.is_some_and(char::is_alphabetic) && !next.is_some_and(char::is_lowercase))
        })
    })
}

fn scan_versus(
    text: &str,
    accept: impl Fn(Option<char>, Option<char>) -> bool,
) -> Option<Range<usize>> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut depth = 0usize;
    for (i, &(pos, c)) in chars.iter().enumerate() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            'V' if depth == 0 => {
                let prev = i.checked_sub(1).map(|j| chars[j].1);
                let next = chars.get(i + 1).map(|&(_, c)| c);
                if accept(prev, next) {
                    return Some(pos..pos + 1);
                }
            }
            _ => {}
        }
    }
    None
}
