use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::result::{SearchResult, SourceFailure};
use crate::data_source::RawCandidate;
use crate::retry::ResilientFetcher;
use crate::{FetchError, SourceId, SourceRegistry, ValidationError};

/// Queries every registered source concurrently and merges the hits.
///
/// A failing source is skipped and recorded in
/// [`SearchResult::failures`]; the search itself only fails on invalid input.
#[derive(Debug, Clone)]
pub struct SearchAggregator {
    registry: Arc<SourceRegistry>,
    fetcher: ResilientFetcher,
}

type SourceOutcome = (usize, SourceId, Result<Vec<RawCandidate>, FetchError>);

impl SearchAggregator {
    pub fn new(registry: Arc<SourceRegistry>) -> Self {
        Self {
            registry,
            fetcher: ResilientFetcher::default(),
        }
    }

    pub fn with_fetcher(mut self, fetcher: ResilientFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn registry(&self) -> &Arc<SourceRegistry> {
        &self.registry
    }

    pub async fn search(&self, query: &str) -> Result<SearchResult, ValidationError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }

        let mut tasks = JoinSet::new();
        for (position, source) in self.registry.sources().enumerate() {
            let source = Arc::clone(source);
            let fetcher = self.fetcher;
            let query = query.to_owned();
            tasks.spawn(async move {
                let outcome = fetcher.search_candidates(&source, &query).await;
                (position, source.id(), outcome)
            });
        }

        let mut outcomes: Vec<SourceOutcome> = Vec::with_capacity(self.registry.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(error) => warn!(error = %error, "search task did not complete"),
            }
        }
        // Merge in registry order, not completion order.
        outcomes.sort_by_key(|(position, _, _)| *position);

        let mut symbols = Vec::new();
        let mut failures = Vec::new();
        for (_, source_id, outcome) in outcomes {
            match outcome {
                Ok(candidates) => {
                    debug!(source = %source_id, hits = candidates.len(), "source answered search");
                    for candidate in candidates {
                        match candidate.into_symbol(source_id) {
                            Ok(symbol) => symbols.push(symbol),
                            Err(error) => {
                                debug!(source = %source_id, error = %error, "dropping malformed candidate")
                            }
                        }
                    }
                }
                Err(error) => {
                    warn!(source = %source_id, error = %error, "skipping source in search");
                    failures.push(SourceFailure::new(source_id, &error));
                }
            }
        }

        Ok(SearchResult::new(query, symbols).with_failures(failures))
    }
}
