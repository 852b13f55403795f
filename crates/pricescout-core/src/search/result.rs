use std::fmt::{Display, Formatter};

use serde::Serialize;

use super::filter::SymbolFilter;
use super::matcher::MatchKind;
use super::ranking::{bucketize, dedupe, sort_by_match, Bucket};
use crate::{FetchError, SourceId, Symbol};

/// Lists longer than this are summarized by count in the text rendering.
const MAX_LISTED: usize = 5;

/// A source that was skipped while searching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source: SourceId,
    pub code: &'static str,
    pub message: String,
}

impl SourceFailure {
    pub fn new(source: SourceId, error: &FetchError) -> Self {
        Self {
            source,
            code: error.code(),
            message: error.to_string(),
        }
    }
}

/// Ranked, bucketed, filterable outcome of a search.
///
/// `symbols` is always deduplicated and sorted by match quality, and the
/// buckets always reflect it. Serialized output carries the buckets, whose
/// concatenation equals the symbol list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    query: String,
    #[serde(skip)]
    symbols: Vec<Symbol>,
    buckets: Vec<Bucket>,
    filter_history: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<SourceFailure>,
}

impl SearchResult {
    pub fn new(query: impl Into<String>, symbols: Vec<Symbol>) -> Self {
        let mut result = Self {
            query: query.into(),
            symbols: Vec::new(),
            buckets: Vec::new(),
            filter_history: Vec::new(),
            failures: Vec::new(),
        };
        result.set_symbols(symbols);
        result
    }

    pub fn with_failures(mut self, failures: Vec<SourceFailure>) -> Self {
        self.failures = failures;
        self
    }

    /// Merges more symbols in, then re-deduplicates, re-sorts and re-buckets.
    pub fn add_symbols<I>(&mut self, symbols: I) -> &mut Self
    where
        I: IntoIterator<Item = Symbol>,
    {
        let mut merged = std::mem::take(&mut self.symbols);
        merged.extend(symbols);
        self.set_symbols(merged);
        self
    }

    /// New result holding the symbols `filter` accepts; the filter is appended
    /// to the history. The original result is left untouched.
    pub fn filter(&self, filter: &SymbolFilter) -> Self {
        let kept = self
            .symbols
            .iter()
            .filter(|symbol| filter.matches(symbol))
            .cloned()
            .collect();

        let mut filtered = Self::new(self.query.clone(), kept);
        filtered.filter_history = self.filter_history.clone();
        filtered.filter_history.extend(filter.describe());
        filtered.failures = self.failures.clone();
        filtered
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn bucket(&self, kind: MatchKind) -> Option<&Bucket> {
        self.buckets.iter().find(|bucket| bucket.kind() == kind)
    }

    /// Symbol count of every bucket, in ranking order.
    pub fn bucket_sizes(&self) -> Vec<usize> {
        self.buckets.iter().map(Bucket::len).collect()
    }

    pub fn filter_history(&self) -> &[String] {
        &self.filter_history
    }

    pub fn failures(&self) -> &[SourceFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    fn set_symbols(&mut self, symbols: Vec<Symbol>) {
        let mut symbols = dedupe(symbols);
        sort_by_match(&self.query, &mut symbols);
        self.buckets = bucketize(&self.query, &symbols);
        self.symbols = symbols;
    }
}

impl Display for SearchResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Search results for query '{}'", self.query)?;
        if !self.filter_history.is_empty() {
            writeln!(f, "With filters: {}", self.filter_history.join(", "))?;
        }

        for (index, bucket) in self.buckets.iter().enumerate() {
            writeln!(f, "Bucket {}: {}", index + 1, bucket.name())?;
            if bucket.is_empty() {
                writeln!(f, "  No hits")?;
                continue;
            }

            let sources = bucket.sources();
            writeln!(f, "  {} hits, {} sources", bucket.len(), sources.len())?;
            if bucket.len() <= MAX_LISTED {
                for symbol in bucket.symbols() {
                    writeln!(f, "  - {symbol}")?;
                }
            }
            if sources.len() <= MAX_LISTED {
                let names: Vec<_> = sources.iter().map(|id| id.as_str()).collect();
                writeln!(f, "  Sources: {}", names.join(", "))?;
            }
        }

        for failure in &self.failures {
            writeln!(f, "Skipped {}: {}", failure.source, failure.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceError;

    fn coin(name: &str, id: &str) -> Symbol {
        Symbol::new(name, SourceId::Coingecko)
            .expect("valid symbol")
            .with_query(id)
            .with_aliases([id])
    }

    #[test]
    fn new_result_is_sorted_and_bucketed() {
        let result = SearchResult::new(
            "btc",
            vec![coin("wbtc", "wrapped-bitcoin"), coin("btc", "bitcoin")],
        );

        assert_eq!(result.symbols()[0].name(), "btc");
        assert_eq!(result.bucket_sizes(), [1, 0, 1, 0]);
        assert_eq!(
            result.bucket(MatchKind::Substring).map(Bucket::len),
            Some(1)
        );
    }

    #[test]
    fn add_symbols_merges_and_dedupes() {
        let mut result = SearchResult::new("btc", vec![coin("btc", "bitcoin")]);

        result.add_symbols([coin("btc", "bitcoin"), coin("BTC", "bitcoin-token")]);

        assert_eq!(result.len(), 2);
        assert_eq!(result.bucket_sizes(), [2, 0, 0, 0]);
    }

    #[test]
    fn filter_returns_new_result_and_records_history() {
        let result = SearchResult::new("btc", vec![coin("btc", "bitcoin")]);

        let filtered = result.filter(&SymbolFilter::new().source(SourceId::Yahoo));

        assert!(filtered.is_empty());
        assert_eq!(filtered.filter_history(), ["source=yahoo"]);
        assert_eq!(result.len(), 1);
        assert!(result.filter_history().is_empty());
    }

    #[test]
    fn display_summarizes_buckets_and_failures() {
        let result = SearchResult::new("btc", vec![coin("btc", "bitcoin")]).with_failures(vec![
            SourceFailure::new(
                SourceId::Yahoo,
                &FetchError::Source(SourceError::internal("boom")),
            ),
        ]);

        let text = result.to_string();

        assert!(text.starts_with("Search results for query 'btc'\n"));
        assert!(text.contains("Bucket 1: exact\n  1 hits, 1 sources\n"));
        assert!(text.contains("Bucket 2: word-boundary\n  No hits\n"));
        assert!(text.contains("Skipped yahoo: boom (source.internal)"));
    }
}
