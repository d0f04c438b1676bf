use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::text::parse_text;
use super::{
    find_ends, find_score, has_marker, non_empty_or, normalize_ws, strip_marker, ParseMatchup,
    WALKOVER_TOKEN,
};
use crate::config::{ChallengerAnchor, ParserConfig};
use crate::error::Result;
use crate::model::{MatchRecord, MatchStatus, Score, Side, NOT_AVAILABLE, UNKNOWN};

/// Reads a matchup from a results-cell fragment whose elements are tagged
/// by role (team name, team location, result, ends, challenger marker).
///
/// Fragments without any tagged element are flattened to text and handed
/// to [`TextParser`](super::TextParser).
#[derive(Debug, Clone)]
pub struct MarkupParser {
    team_name: Selector,
    team_location: Selector,
    result: Selector,
    ends: Selector,
    challenger_marker: Selector,
    anchor: ChallengerAnchor,
    placeholder: String,
}

/// A team-name element and what was attached to it while walking the cell.
struct Team<'a> {
    element: ElementRef<'a>,
    text: String,
    location: Option<String>,
}

/// A challenger marker and the index of the team preceding it.
struct Marker<'a> {
    element: ElementRef<'a>,
    preceding: Option<usize>,
}

/// Role-tagged content of one cell, in document order.
#[derive(Default)]
struct Cell<'a> {
    teams: Vec<Team<'a>>,
    markers: Vec<Marker<'a>>,
    result: Option<String>,
    ends: Option<String>,
}

impl Cell<'_> {
    fn is_tagged(&self) -> bool {
        !self.teams.is_empty()
            || !self.markers.is_empty()
            || self.result.is_some()
            || self.ends.is_some()
    }
}

impl ParseMatchup for MarkupParser {
    fn parse_matchup(&self, input: &str) -> MatchRecord {
        let fragment = Html::parse_fragment(input);
        let root = fragment.root_element();
        let cell = self.scan(root);
        if !cell.is_tagged() {
            let text = element_text(root);
            debug!(text = %text, "no role-tagged elements, reading cell as text");
            return parse_text(&text);
        }
        self.classify(&cell)
    }
}

impl MarkupParser {
    pub fn new(config: &ParserConfig) -> Result<Self> {
        let selectors = &config.selectors;
        Ok(Self {
            team_name: Selector::parse(&selectors.team_name)?,
            team_location: Selector::parse(&selectors.team_location)?,
            result: Selector::parse(&selectors.result)?,
            ends: Selector::parse(&selectors.ends)?,
            challenger_marker: Selector::parse(&selectors.challenger_marker)?,
            anchor: config.anchor,
            placeholder: config.placeholder.clone(),
        })
    }

    fn scan<'a>(&self, root: ElementRef<'a>) -> Cell<'a> {
        let mut cell = Cell::default();
        let mut pending_location = None;
        for element in root.descendants().filter_map(ElementRef::wrap) {
            if self.team_name.matches(&element) {
                cell.teams.push(Team {
                    element,
                    text: self.own_text(element),
                    location: pending_location.take(),
                });
            } else if self.team_location.matches(&element) {
                let location = element_text(element);
                match cell.teams.last_mut() {
                    Some(team) if team.location.is_none() => team.location = Some(location),
                    Some(_) => {}
                    None => pending_location = Some(location),
                }
            } else if self.result.matches(&element) {
                cell.result.get_or_insert_with(|| element_text(element));
            } else if self.ends.matches(&element) {
                cell.ends.get_or_insert_with(|| element_text(element));
            }

            if self.challenger_marker.matches(&element) {
                cell.markers.push(Marker {
                    element,
                    preceding: cell.teams.len().checked_sub(1),
                });
            }
        }
        cell
    }

    /// Text of a team-name element without nested marker or location text.
    fn own_text(&self, element: ElementRef) -> String {
        let text = element
            .descendants()
            .filter_map(|node| {
                let text = node.value().as_text()?;
                let nested = node
                    .ancestors()
                    .take_while(|ancestor| ancestor.id() != element.id())
                    .filter_map(ElementRef::wrap)
                    .any(|ancestor| {
                        self.challenger_marker.matches(&ancestor)
                            || self.team_location.matches(&ancestor)
                    });
                (!nested).then(|| text.trim())
            })
            .join(" ");
        normalize_ws(&text)
    }

    fn side(&self, team: &Team) -> Side {
        match &team.location {
            Some(location) => {
                let name = strip_marker(&team.text);
                let origin = location.trim_matches(|c: char| c == '(' || c == ')' || c.is_whitespace());
                Side::new(
                    non_empty_or(&name, UNKNOWN),
                    non_empty_or(origin, NOT_AVAILABLE),
                )
            }
            None => Side::from_text(&team.text),
        }
    }

    fn challenger_index(&self, cell: &Cell) -> Option<usize> {
        let Some(marker) = cell.markers.first() else {
            return cell.teams.iter().position(|team| has_marker(&team.text));
        };
        if cell.markers.len() > 1 {
            debug!(markers = cell.markers.len(), "several challenger markers, using the first");
        }
        let enclosing = match self.anchor {
            ChallengerAnchor::Enclosing => self.enclosing_team(marker.element, &cell.teams),
            ChallengerAnchor::Preceding => None,
        };
        enclosing.or(marker.preceding).or(Some(0))
    }

    /// Team named by the closest ancestor of `marker` that holds a team name.
    fn enclosing_team(&self, marker: ElementRef, teams: &[Team]) -> Option<usize> {
        marker
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find_map(|ancestor| {
                let team = ancestor
                    .descendants()
                    .filter_map(ElementRef::wrap)
                    .find(|element| self.team_name.matches(element))?;
                teams.iter().position(|t| t.element == team)
            })
    }

    fn classify(&self, cell: &Cell) -> MatchRecord {
        // Team positions are kept so the challenger index still lines up
        // once placeholder names are dropped.
        let named = cell
            .teams
            .iter()
            .map(|team| self.side(team))
            .enumerate()
            .filter(|(_, side)| side.name != self.placeholder)
            .collect_vec();
        if named.is_empty() {
            debug!(teams = cell.teams.len(), "matchup not yet determined");
            return MatchRecord::undetermined(&self.placeholder);
        }

        let challenger = self.challenger_index(cell);
        if let Some(&(bye, _)) = named.iter().find(|(_, side)| side.is_bye()) {
            let other = named
                .iter()
                .find(|&&(i, _)| i != bye)
                .map(|(_, side)| side.clone())
                .unwrap_or_else(Side::unknown);
            return MatchRecord::bye(other, challenger == Some(bye));
        }

        let score = read_score(cell.result.as_deref());
        let ends = match score {
            Score::Walkover => None,
            _ => read_ends(cell),
        };
        let (first, second) = match named.as_slice() {
            [first, second, rest @ ..] => {
                if !rest.is_empty() {
                    debug!(extra = rest.len(), "ignoring team names beyond the first two");
                }
                (first, second)
            }
            [(index, only)] => {
                return partial(only.clone(), challenger == Some(*index), score, ends);
            }
            [] => return partial(Side::unknown(), false, score, ends),
        };

        let (challenger, opponent, challenger_first) = orient(first, second, challenger);
        if score == Score::Walkover {
            return MatchRecord::walkover(challenger, opponent);
        }
        let score = if challenger_first {
            score
        } else {
            score.reversed()
        };
        MatchRecord::new(challenger, opponent, score, ends, status_for(score))
    }
}

/// `(challenger, opponent, challenger_first)` for two indexed teams.
fn orient(
    (first_index, first): &(usize, Side),
    (second_index, second): &(usize, Side),
    challenger: Option<usize>,
) -> (Side, Side, bool) {
    let challenger_first = match challenger {
        Some(index) if index == *first_index => true,
        Some(index) if index == *second_index => false,
        other => {
            debug!(marker = ?other, "no usable challenger marker, using positional fallback");
            false
        }
    };
    if challenger_first {
        (first.clone(), second.clone(), true)
    } else {
        (second.clone(), first.clone(), false)
    }
}

/// Only one team is known; the other side is reported as unknown.
fn partial(side: Side, is_challenger: bool, score: Score, ends: Option<u32>) -> MatchRecord {
    let (challenger, opponent) = if is_challenger {
        (side, Side::unknown())
    } else {
        (Side::unknown(), side)
    };
    MatchRecord::new(challenger, opponent, score, ends, MatchStatus::Partial)
}

fn status_for(score: Score) -> MatchStatus {
    match score {
        Score::NoScore => MatchStatus::Scheduled,
        Score::Walkover => MatchStatus::Walkover,
        Score::Points { .. } | Score::Invalid => MatchStatus::Played,
    }
}

fn read_score(result: Option<&str>) -> Score {
    let Some(text) = result else {
        return Score::NoScore;
    };
    if text.contains(WALKOVER_TOKEN) {
        return Score::Walkover;
    }
    let text = match find_ends(text) {
        Some((span, _)) => format!("{}{}", &text[..span.start], &text[span.end..]),
        None => text.to_string(),
    };
    if !text.contains(|c: char| c == '-' || c == '–') {
        return Score::NoScore;
    }
    match find_score(&text) {
        Some(found) => found.score,
        None if text.chars().any(|c| c.is_ascii_digit()) => Score::Invalid,
        None => Score::NoScore,
    }
}

fn read_ends(cell: &Cell) -> Option<u32> {
    let from_ends = cell.ends.as_deref().and_then(|text| {
        text.split(|c: char| !c.is_ascii_digit())
            .find(|digits| !digits.is_empty())?
            .parse()
            .ok()
    });
    from_ends.or_else(|| {
        cell.result
            .as_deref()
            .and_then(find_ends)
            .map(|(_, ends)| ends)
    })
}

fn element_text(element: ElementRef) -> String {
    normalize_ws(&element.text().join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BYE, TBC};

    fn parser() -> MarkupParser {
        MarkupParser::new(&ParserConfig::default()).unwrap()
    }

    fn enclosing_parser() -> MarkupParser {
        MarkupParser::new(&ParserConfig {
            anchor: ChallengerAnchor::Enclosing,
            ..ParserConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_challenger_first() {
        let html = r#"<div class="matchup">
            <span class="team-name">Smith</span><span class="team-location">(Anytown)</span>
            <span class="challenger-marker">(Challenger)</span>
            <span class="result">21 - 14</span>
            <span class="team-name">Jones</span><span class="team-location">(Elmfield)</span>
            <span class="ends">Ends: 18</span>
        </div>"#;
        let record = parser().parse_matchup(html);
        assert_eq!(record.challenger, "Smith");
        assert_eq!(record.challenger_origin, "Anytown");
        assert_eq!(record.opponent, "Jones");
        assert_eq!(record.opponent_origin, "Elmfield");
        assert_eq!(record.score.to_string(), "21 - 14");
        assert_eq!(record.ends, Some(18));
        assert_eq!(record.status, MatchStatus::Played);
    }

    #[test]
    fn test_challenger_second_reverses_score() {
        let html = r#"<span class="team-name">Smith</span><span class="team-location">Anytown</span>
            <span class="result">14 - 21</span>
            <span class="team-name">Jones</span><span class="team-location">Elmfield</span>
            <span class="challenger-marker">(Challenger)</span>"#;
        let record = parser().parse_matchup(html);
        assert_eq!(record.challenger, "Jones");
        assert_eq!(record.opponent, "Smith");
        assert_eq!(record.score, Score::points(21, 14));
    }

    #[test]
    fn test_nested_marker_and_location() {
        let html = r#"<p><span class="team-name">Smith <em class="challenger-marker">(Challenger)</em>
            <small class="team-location">Anytown</small></span>
            <span class="result">9 - 21</span>
            <span class="team-name">Jones <small class="team-location">Elmfield</small></span></p>"#;
        let record = parser().parse_matchup(html);
        assert_eq!(record.challenger, "Smith");
        assert_eq!(record.challenger_origin, "Anytown");
        assert_eq!(record.opponent, "Jones");
        assert_eq!(record.opponent_origin, "Elmfield");
        assert_eq!(record.score.to_string(), "9 - 21");
    }

    #[test]
    fn test_anchor_modes_disagree_on_leading_marker() {
        let html = r#"<div class="side"><span class="team-name">Smith</span></div>
            <span class="result">9 - 21</span>
            <div class="side"><span class="challenger-marker">*</span><span class="team-name">Jones</span></div>"#;

        let record = parser().parse_matchup(html);
        assert_eq!(record.challenger, "Smith");
        assert_eq!(record.score.to_string(), "9 - 21");

        let record = enclosing_parser().parse_matchup(html);
        assert_eq!(record.challenger, "Jones");
        assert_eq!(record.opponent, "Smith");
        assert_eq!(record.score.to_string(), "21 - 9");
    }

    #[test]
    fn test_marker_before_all_teams_picks_first() {
        let html = r#"<span class="challenger-marker">C</span><span class="team-name">Smith</span>
            <span class="team-name">Jones</span>"#;
        let record = parser().parse_matchup(html);
        assert_eq!(record.challenger, "Smith");
        assert_eq!(record.status, MatchStatus::Scheduled);
    }

    #[test]
    fn test_textual_marker_in_team_name() {
        let html = r#"<span class="team-name">Jones (Elmfield)</span><span class="result">3 - 21</span>
            <span class="team-name">Smith (Anytown)(Challenger)</span>"#;
        let record = parser().parse_matchup(html);
        assert_eq!(record.challenger, "Smith");
        assert_eq!(record.challenger_origin, "Anytown");
        assert_eq!(record.opponent, "Jones");
        assert_eq!(record.score, Score::points(21, 3));
    }

    #[test]
    fn test_no_marker_is_positional() {
        let html = r#"<span class="team-name">Jones</span><span class="result">3 - 21</span>
            <span class="team-name">Smith</span>"#;
        let record = parser().parse_matchup(html);
        assert_eq!(record.challenger, "Smith");
        assert_eq!(record.opponent, "Jones");
        assert_eq!(record.score, Score::points(21, 3));
    }

    #[test]
    fn test_all_tbc_is_undetermined() {
        let html = r#"<span class="team-name">TBC</span><span class="result">-</span>
            <span class="team-name">TBC</span>"#;
        let record = parser().parse_matchup(html);
        assert_eq!(record.status, MatchStatus::Undetermined);
        assert_eq!(record.challenger, TBC);
        assert_eq!(record.opponent, TBC);
        assert_eq!(record.score, Score::NoScore);
        assert_eq!(record.ends_text(), "N/A");
    }

    #[test]
    fn test_no_team_names_is_undetermined() {
        let record = parser().parse_matchup(r#"<span class="result">21 - 3</span>"#);
        assert_eq!(record.status, MatchStatus::Undetermined);
    }

    #[test]
    fn test_single_team_is_partial() {
        let html = r#"<span class="team-name">Smith</span><span class="team-location">Anytown</span>
            <span class="challenger-marker">(Challenger)</span>"#;
        let record = parser().parse_matchup(html);
        assert_eq!(record.status, MatchStatus::Partial);
        assert_eq!(record.challenger, "Smith");
        assert_eq!(record.opponent, UNKNOWN);
        assert_eq!(record.opponent_origin, UNKNOWN);
    }

    #[test]
    fn test_one_team_against_placeholder_is_partial() {
        let html = r#"<span class="team-name">Smith</span><span class="challenger-marker">C</span>
            <span class="team-name">TBC</span>"#;
        let record = parser().parse_matchup(html);
        assert_eq!(record.status, MatchStatus::Partial);
        assert_eq!(record.challenger, "Smith");
        assert_eq!(record.opponent, UNKNOWN);

        let html = r#"<span class="team-name">TBC</span><span class="team-name">Jones</span>"#;
        let record = parser().parse_matchup(html);
        assert_eq!(record.status, MatchStatus::Partial);
        assert_eq!(record.challenger, UNKNOWN);
        assert_eq!(record.opponent, "Jones");
    }

    #[test]
    fn test_bye_team() {
        let html = r#"<span class="team-name">BYE</span><span class="challenger-marker">(Challenger)</span>
            <span class="team-name">Smith</span><span class="team-location">Anytown</span>"#;
        let record = parser().parse_matchup(html);
        assert_eq!(record.status, MatchStatus::Bye);
        assert_eq!(record.challenger, BYE);
        assert_eq!(record.opponent, "Smith");
        assert_eq!(record.opponent_origin, "Anytown");
        assert_eq!(record.score, Score::NoScore);
    }

    #[test]
    fn test_walkover_result() {
        let html = r#"<span class="team-name">Jones</span><span class="result">W/O</span>
            <span class="team-name">Smith</span><span class="challenger-marker">(Challenger)</span>
            <span class="ends">7</span>"#;
        let record = parser().parse_matchup(html);
        assert_eq!(record.status, MatchStatus::Walkover);
        assert_eq!(record.challenger, "Smith");
        assert_eq!(record.score, Score::Walkover);
        assert_eq!(record.ends, None);
    }

    #[test]
    fn test_score_without_dash_is_no_score() {
        for result in ["Postponed", "21", ""] {
            let html = format!(
                r#"<span class="team-name">Jones</span><span class="result">{result}</span>
                <span class="team-name">Smith</span>"#
            );
            let record = parser().parse_matchup(&html);
            assert_eq!(record.score, Score::NoScore, "result {result:?}");
            assert_eq!(record.status, MatchStatus::Scheduled);
        }
    }

    #[test]
    fn test_dash_with_stray_digits_is_invalid() {
        let html = r#"<span class="team-name">Jones</span><span class="result">21 -</span>
            <span class="team-name">Smith</span>"#;
        assert_eq!(parser().parse_matchup(html).score, Score::Invalid);
    }

    #[test]
    fn test_ends_inside_result() {
        let html = r#"<span class="team-name">Smith</span><span class="challenger-marker">C</span>
            <span class="result">21 - 9 Ends: 17</span><span class="team-name">Jones</span>"#;
        let record = parser().parse_matchup(html);
        assert_eq!(record.score, Score::points(21, 9));
        assert_eq!(record.ends, Some(17));
    }

    #[test]
    fn test_untagged_fragment_falls_back_to_text() {
        let html = "<div>Jones (Elmfield)<br>V<br>Smith (Anytown)(Challenger) 14 - 21</div>";
        let record = parser().parse_matchup(html);
        assert_eq!(record.challenger, "Smith");
        assert_eq!(record.opponent, "Jones");
        assert_eq!(record.score, Score::points(21, 14));
    }

    #[test]
    fn test_custom_selectors() {
        let mut config = ParserConfig::default();
        config.selectors.team_name = "b".to_string();
        config.selectors.result = "td.score".to_string();
        let parser = MarkupParser::new(&config).unwrap();
        let record = parser.parse_matchup("<b>Jones</b> <i>v</i> <b>Smith (Anytown)(Challenger)</b>");
        assert_eq!(record.challenger, "Smith");
        assert_eq!(record.opponent, "Jones");
    }

    #[test]
    fn test_invalid_selector() {
        let mut config = ParserConfig::default();
        config.selectors.result = "span[".to_string();
        assert!(matches!(
            MarkupParser::new(&config),
            Err(crate::error::MatchupError::Selector(_))
        ));
    }
}
