//! # Search
//!
//! Cross-source symbol search.
//!
//! [`SearchAggregator`] fans a query out to every registered source, then
//! [`SearchResult`] deduplicates the hits by source and query, ranks them by
//! match quality and groups them into buckets:
//!
//! | Bucket | Hit when the query |
//! |--------|--------------------|
//! | `exact` | equals the name (best) or an alias |
//! | `word-boundary` | appears as a whole word in name, aliases or query |
//! | `substring` | appears anywhere in name, aliases or query |
//! | `none` | matched nothing above |
//!
//! Results can be narrowed with [`SymbolFilter`], which yields a new result
//! and records the applied filter.

mod aggregator;
mod filter;
mod matcher;
mod ranking;
mod result;

pub use aggregator::SearchAggregator;
pub use filter::SymbolFilter;
pub use matcher::{
    classify, matches_exact, matches_substring, matches_word_boundary, sort_key, MatchKind,
    MatchScore, NO_MATCH_SORT_KEY,
};
pub use ranking::{bucketize, dedupe, sort_by_match, Bucket};
pub use result::{SearchResult, SourceFailure};
