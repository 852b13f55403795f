//! Match predicates used to rank and bucket search hits.
//!
//! Every predicate returns a score where `0` means "no match" and smaller
//! positive values mean better matches. Comparisons are case-insensitive.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::Symbol;

/// Score of a predicate. `0` is no match.
pub type MatchScore = u32;

/// Added per predicate that did not match, so earlier predicates always rank
/// ahead of later ones.
const SORT_STEP: u32 = 10;
/// Key of symbols no predicate matches.
pub const NO_MATCH_SORT_KEY: u32 = 999;

/// Quality class of a hit, in ranking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKind {
    Exact,
    WordBoundary,
    Substring,
    None,
}

impl MatchKind {
    pub const ALL: [Self; 4] = [Self::Exact, Self::WordBoundary, Self::Substring, Self::None];
    /// Kinds backed by a predicate, strongest first.
    pub const PREDICATES: [Self; 3] = [Self::Exact, Self::WordBoundary, Self::Substring];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::WordBoundary => "word-boundary",
            Self::Substring => "substring",
            Self::None => "none",
        }
    }

    /// Score of this kind's predicate. [`MatchKind::None`] never scores.
    pub fn score(self, query: &str, symbol: &Symbol) -> MatchScore {
        match self {
            Self::Exact => matches_exact(query, symbol),
            Self::WordBoundary => matches_word_boundary(query, symbol),
            Self::Substring => matches_substring(query, symbol),
            Self::None => 0,
        }
    }
}

impl Display for MatchKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1 when the name equals the query, 2 when an alias does.
pub fn matches_exact(query: &str, symbol: &Symbol) -> MatchScore {
    let query = query.to_lowercase();
    if symbol.name().to_lowercase() == query {
        return 1;
    }
    if symbol
        .aliases()
        .iter()
        .any(|alias| alias.to_lowercase() == query)
    {
        return 2;
    }
    0
}

/// The query appears as a whole word: 1 in the name, 2 in the aliases,
/// 3 in the query string.
pub fn matches_word_boundary(query: &str, symbol: &Symbol) -> MatchScore {
    let query = query.to_lowercase();
    score_fields(symbol, |text| contains_word(text, &query))
}

/// The query appears anywhere: 1 in the name, 2 in the aliases, 3 in the
/// query string.
pub fn matches_substring(query: &str, symbol: &Symbol) -> MatchScore {
    let query = query.to_lowercase();
    score_fields(symbol, |text| text.contains(query.as_str()))
}

/// Kind and score of the first predicate that matches.
pub fn classify(query: &str, symbol: &Symbol) -> (MatchKind, MatchScore) {
    MatchKind::PREDICATES
        .into_iter()
        .map(|kind| (kind, kind.score(query, symbol)))
        .find(|(_, score)| *score > 0)
        .unwrap_or((MatchKind::None, 0))
}

/// Ranking key: lower sorts first.
pub fn sort_key(query: &str, symbol: &Symbol) -> u32 {
    let mut offset = SORT_STEP;
    for kind in MatchKind::PREDICATES {
        let score = kind.score(query, symbol);
        if score > 0 {
            return offset + score;
        }
        offset += SORT_STEP;
    }
    NO_MATCH_SORT_KEY
}

fn score_fields(symbol: &Symbol, hit: impl Fn(&str) -> bool) -> MatchScore {
    if hit(&symbol.name().to_lowercase()) {
        return 1;
    }
    if hit(&symbol.aliases().join("|").to_lowercase()) {
        return 2;
    }
    if hit(&symbol.query_string().to_lowercase()) {
        return 3;
    }
    0
}

/// `needle` occurs in `haystack` bounded on both sides by the text edge or a
/// character that is not an ASCII letter or digit.
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }

    let is_word_byte = |byte: u8| byte.is_ascii_alphanumeric();
    let bytes = haystack.as_bytes();

    haystack
        .char_indices()
        .filter(|(start, _)| haystack[*start..].starts_with(needle))
        .any(|(start, _)| {
            let end = start + needle.len();
            let open = start == 0 || !is_word_byte(bytes[start - 1]);
            let close = end == bytes.len() || !is_word_byte(bytes[end]);
            open && close
        })
}
