//! Deduplication, ordering and bucketing of symbol lists.

use serde::Serialize;

use super::matcher::{sort_key, MatchKind};
use crate::{SourceId, Symbol};

/// Hits that share a [`MatchKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    #[serde(rename = "name")]
    kind: MatchKind,
    symbols: Vec<Symbol>,
}

impl Bucket {
    pub fn new(kind: MatchKind, symbols: Vec<Symbol>) -> Self {
        Self { kind, symbols }
    }

    pub fn kind(&self) -> MatchKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Distinct sources among the bucket's symbols, in first-seen order.
    pub fn sources(&self) -> Vec<SourceId> {
        let mut seen = Vec::new();
        for symbol in &self.symbols {
            if !seen.contains(&symbol.source()) {
                seen.push(symbol.source());
            }
        }
        seen
    }
}

/// Orders symbols by identity (source plus query) and keeps the first of
/// every identity. The output depends only on the set of symbols and, among
/// duplicates, on which came first, never on the order sources answered in.
pub fn dedupe(symbols: Vec<Symbol>) -> Vec<Symbol> {
    let mut keyed: Vec<(String, Symbol)> = symbols
        .into_iter()
        .map(|symbol| (symbol.identity_key(), symbol))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
    keyed.dedup_by(|(later, _), (kept, _)| later == kept);
    keyed.into_iter().map(|(_, symbol)| symbol).collect()
}

/// Stable sort by match quality against `query`.
pub fn sort_by_match(query: &str, symbols: &mut [Symbol]) {
    symbols.sort_by_key(|symbol| sort_key(query, symbol));
}

/// Splits `symbols` into one bucket per [`MatchKind`], in ranking order.
///
/// Each predicate takes its hits from what earlier predicates left over, so
/// every symbol lands in exactly one bucket and relative order is kept.
pub fn bucketize(query: &str, symbols: &[Symbol]) -> Vec<Bucket> {
    let mut remaining: Vec<Symbol> = symbols.to_vec();
    let mut buckets = Vec::with_capacity(MatchKind::ALL.len());

    for kind in MatchKind::PREDICATES {
        let (hits, rest): (Vec<Symbol>, Vec<Symbol>) = remaining
            .into_iter()
            .partition(|symbol| kind.score(query, symbol) > 0);
        buckets.push(Bucket::new(kind, hits));
        remaining = rest;
    }
    buckets.push(Bucket::new(MatchKind::None, remaining));

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::matcher::classify;

    fn named(name: &str, source: SourceId) -> Symbol {
        Symbol::new(name, source).expect("valid symbol")
    }

    #[test]
    fn dedupe_keeps_first_occurrence_of_each_identity() {
        let input = "ABBBCBB"
            .chars()
            .map(|ch| named(&ch.to_string(), SourceId::Yahoo))
            .collect();

        let names: Vec<_> = dedupe(input)
            .iter()
            .map(|symbol| symbol.name().to_owned())
            .collect();

        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn dedupe_distinguishes_sources() {
        let mut input: Vec<_> = "ABBBCB"
            .chars()
            .map(|ch| named(&ch.to_string(), SourceId::Yahoo))
            .collect();
        input.push(named("B", SourceId::Coingecko));

        let kept: Vec<_> = dedupe(input)
            .iter()
            .map(|symbol| (symbol.name().to_owned(), symbol.source()))
            .collect();

        assert_eq!(
            kept,
            [
                (String::from("B"), SourceId::Coingecko),
                (String::from("A"), SourceId::Yahoo),
                (String::from("B"), SourceId::Yahoo),
                (String::from("C"), SourceId::Yahoo),
            ]
        );
    }

    #[test]
    fn dedupe_prefers_the_earlier_of_two_duplicates() {
        let first = named("BTC", SourceId::Coingecko).with_aliases(["Bitcoin"]);
        let second = named("BTC", SourceId::Coingecko).with_aliases(["Bitcoin Core"]);

        let kept = dedupe(vec![first.clone(), second]);

        assert_eq!(kept, [first]);
    }

    #[test]
    fn equally_ranked_hits_do_not_depend_on_arrival_order() {
        let symbols = vec![
            named("alpha", SourceId::Yahoo),
            named("beta", SourceId::Yahoo),
            named("gamma", SourceId::Coingecko),
        ];
        let mut reversed = symbols.clone();
        reversed.reverse();

        let forward = ranked_identities("zzz", symbols);
        let backward = ranked_identities("zzz", reversed);

        assert_eq!(forward, backward);
        assert_eq!(forward, ["coingecko:gamma", "yahoo:alpha", "yahoo:beta"]);
    }

    /// Identity keys after dedupe, sort and bucketing.
    fn ranked_identities(query: &str, symbols: Vec<Symbol>) -> Vec<String> {
        let mut symbols = dedupe(symbols);
        sort_by_match(query, &mut symbols);
        bucketize(query, &symbols)
            .iter()
            .flat_map(|bucket| bucket.symbols().iter().map(Symbol::identity_key))
            .collect()
    }

    #[test]
    fn sort_is_stable_within_a_key() {
        let mut symbols = vec![
            named("xyz", SourceId::Yahoo),
            named("abc-one", SourceId::Yahoo),
            named("abc", SourceId::Coingecko),
            named("abc-two", SourceId::Yahoo),
        ];

        sort_by_match("abc", &mut symbols);

        let names: Vec<_> = symbols.iter().map(Symbol::name).collect();
        assert_eq!(names, ["abc", "abc-one", "abc-two", "xyz"]);
    }

    #[test]
    fn buckets_partition_input() {
        let symbols = vec![
            named("abc", SourceId::Yahoo),
            named("abc def", SourceId::Yahoo),
            named("abcdef", SourceId::Yahoo),
            named("xyz", SourceId::Yahoo),
            named("ABC", SourceId::Coingecko),
        ];

        let buckets = bucketize("abc", &symbols);

        let sizes: Vec<_> = buckets.iter().map(Bucket::len).collect();
        let names: Vec<_> = buckets.iter().map(Bucket::name).collect();
        assert_eq!(sizes, [2, 1, 1, 1]);
        assert_eq!(names, ["exact", "word-boundary", "substring", "none"]);
        assert_eq!(
            buckets[0].sources(),
            [SourceId::Yahoo, SourceId::Coingecko]
        );
    }

    fn mixed() -> Vec<Symbol> {
        vec![
            named("x", SourceId::Coingecko),
            named("xxaaaxxx", SourceId::Coingecko),
            named("x2", SourceId::Coingecko).with_query("...aaa..."),
            named("x1", SourceId::Yahoo).with_aliases(["aaa"]),
            named("AAA", SourceId::Yahoo),
            named("aaa bbb", SourceId::Yahoo),
        ]
    }

    #[test]
    fn sorting_a_sorted_list_is_a_no_op() {
        let mut once = dedupe(mixed());
        sort_by_match("aaa", &mut once);
        let mut twice = once.clone();
        sort_by_match("aaa", &mut twice);

        assert_eq!(once, twice);
    }

    #[test]
    fn bucket_membership_agrees_with_classification() {
        let mut ranked = dedupe(mixed());
        sort_by_match("aaa", &mut ranked);

        let buckets = bucketize("aaa", &ranked);

        for bucket in &buckets {
            for symbol in bucket.symbols() {
                assert_eq!(classify("aaa", symbol).0, bucket.kind(), "{symbol}");
            }
        }
        let flattened: Vec<Symbol> = buckets
            .iter()
            .flat_map(|bucket| bucket.symbols().iter().cloned())
            .collect();
        assert_eq!(flattened, ranked);
    }
}
