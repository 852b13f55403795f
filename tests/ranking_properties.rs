//! Property-based tests for deduplication, ordering and bucketing.

use std::collections::HashSet;

use proptest::prelude::*;
use pricescout_core::search::{bucketize, classify, dedupe, sort_by_match};
use pricescout_core::{SearchResult, SourceId, Symbol};

// =============================================================================
// Generators
// =============================================================================

fn arb_source() -> impl Strategy<Value = SourceId> {
    prop_oneof![Just(SourceId::Yahoo), Just(SourceId::Coingecko)]
}

/// Small alphabet so that exact, word-boundary and substring hits all occur.
fn arb_symbol() -> impl Strategy<Value = Symbol> {
    (
        arb_source(),
        "[ab]{1,3}([ .-][ab]{1,2})?",
        proptest::option::of("[ab]{1,3}"),
        proptest::collection::vec("[abx ]{1,4}", 0..3),
    )
        .prop_map(|(source, name, query, aliases)| {
            let symbol = Symbol::new(name, source)
                .expect("generated names are never blank")
                .with_aliases(aliases);
            match query {
                Some(query) => symbol.with_query(query),
                None => symbol,
            }
        })
}

fn arb_symbols() -> impl Strategy<Value = Vec<Symbol>> {
    proptest::collection::vec(arb_symbol(), 0..12)
}

fn arb_query() -> impl Strategy<Value = String> {
    "[abx]{1,2}"
}

fn keys(symbols: &[Symbol]) -> Vec<String> {
    symbols.iter().map(Symbol::identity_key).collect()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn dedupe_leaves_one_symbol_per_identity(symbols in arb_symbols()) {
        let input_keys: HashSet<String> = keys(&symbols).into_iter().collect();

        let deduped = dedupe(symbols);
        let output_keys = keys(&deduped);
        let unique: HashSet<String> = output_keys.iter().cloned().collect();

        prop_assert_eq!(unique.len(), output_keys.len());
        prop_assert_eq!(unique, input_keys);
    }

    #[test]
    fn sorting_twice_changes_nothing(symbols in arb_symbols(), query in arb_query()) {
        let mut once = dedupe(symbols);
        sort_by_match(&query, &mut once);
        let mut twice = once.clone();
        sort_by_match(&query, &mut twice);

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn buckets_concatenate_to_the_ranked_symbols(symbols in arb_symbols(), query in arb_query()) {
        let result = SearchResult::new(query, symbols);

        let flattened: Vec<Symbol> = result
            .buckets()
            .iter()
            .flat_map(|bucket| bucket.symbols().iter().cloned())
            .collect();

        prop_assert_eq!(flattened.as_slice(), result.symbols());
    }

    #[test]
    fn every_symbol_lands_in_the_bucket_of_its_first_matching_predicate(
        symbols in arb_symbols(),
        query in arb_query(),
    ) {
        let mut ranked = dedupe(symbols);
        sort_by_match(&query, &mut ranked);

        for bucket in bucketize(&query, &ranked) {
            for symbol in bucket.symbols() {
                prop_assert_eq!(classify(&query, symbol).0, bucket.kind());
            }
        }
    }

    #[test]
    fn ranking_ignores_the_order_of_distinct_symbols(
        symbols in arb_symbols(),
        query in arb_query(),
    ) {
        let distinct = dedupe(symbols);
        let mut reversed = distinct.clone();
        reversed.reverse();

        let forward = SearchResult::new(query.clone(), distinct);
        let backward = SearchResult::new(query, reversed);

        prop_assert_eq!(forward.symbols(), backward.symbols());
    }
}
