use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::model::CandidateResult;

/// How far a candidate's year may drift from the library year and still match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearWindow {
    pub before: i32,
    pub after: i32,
}

/// Catalog release years for movies are usually within a year of the library's.
pub const MOVIE_YEAR_WINDOW: YearWindow = YearWindow {
    before: 1,
    after: 1,
};

/// Box sets for series are often released years after the first season aired.
pub const SERIES_YEAR_WINDOW: YearWindow = YearWindow {
    before: 1,
    after: 5,
};

impl YearWindow {
    pub fn bounds(self, year: i32) -> RangeInclusive<i32> {
        year.saturating_sub(self.before)..=year.saturating_add(self.after)
    }
}

/// Canonical form used to compare titles coming from different sources.
///
/// Lowercases, drops apostrophes and colons, removes bracketed qualifiers such
/// as `(Deluxe)` or `[Remastered]`, maps Unicode dashes to `-` and collapses
/// whitespace. Leading articles are kept.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let stripped = strip_bracketed(&lowered);
    let mapped: String = stripped
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2018}' | '\u{2019}' | ':'))
        .map(|c| if is_unicode_dash(c) { '-' } else { c })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_unicode_dash(c: char) -> bool {
    matches!(c, '\u{2010}'..='\u{2015}' | '\u{2212}' | '\u{FE58}' | '\u{FE63}' | '\u{FF0D}')
}

// Unterminated openers are kept as literal text.
fn strip_bracketed(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        let closer = match chars[i] {
            '(' => Some(')'),
            '[' => Some(']'),
            '{' => Some('}'),
            _ => None,
        };
        if let Some(closer) = closer {
            if let Some(offset) = chars[i + 1..].iter().position(|&c| c == closer) {
                i += offset + 2;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Marks every candidate whose normalized title equals `library_title` and
/// whose year lies inside `bounds`. Returns how many were marked.
///
/// Candidates without a year never match.
pub fn mark_best_match(
    library_title: &str,
    candidates: &mut [CandidateResult],
    bounds: RangeInclusive<i32>,
) -> usize {
    let wanted = normalize_title(library_title);
    let mut marked = 0;
    for candidate in candidates.iter_mut() {
        let year_ok = candidate.year.is_some_and(|year| bounds.contains(&year));
        if year_ok && normalize_title(&candidate.title) == wanted {
            candidate.best_match = true;
            marked += 1;
        }
    }
    marked
}
