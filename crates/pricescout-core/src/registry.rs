//! Source registry: the fixed, ordered set of sources a process talks to.
//!
//! Every [`Source`] pairs an adapter with its own [`RateLimiter`]. The registry
//! is built once and shared behind an `Arc`; limiter state is the only thing
//! that changes afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::adapters::{CoingeckoSource, YahooSource};
use crate::data_source::{RawCandidate, SourceAdapter, SourceError};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::source_policy::SourcePolicy;
use crate::throttling::{RateLimiter, RateLimiterStats};
use crate::{CurrencyPreference, FetchError, PriceHistory, SourceId, SymbolQuery};

/// One external source: adapter plus its rate limiter.
pub struct Source {
    id: SourceId,
    adapter: Arc<dyn SourceAdapter>,
    rate_limiter: RateLimiter,
}

impl Source {
    pub fn new(adapter: Arc<dyn SourceAdapter>, policy: &SourcePolicy) -> Self {
        Self {
            id: adapter.id(),
            adapter,
            rate_limiter: RateLimiter::from_policy(policy),
        }
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// One paced call to the adapter's price endpoint.
    pub async fn fetch_price_history(
        &self,
        query: &SymbolQuery,
        currency: &CurrencyPreference,
    ) -> Result<PriceHistory, SourceError> {
        self.rate_limiter.rate_limit().await;
        self.adapter.price_history(query, currency).await
    }

    /// One paced call to the adapter's search endpoint.
    pub async fn fetch_search_candidates(
        &self,
        query: &str,
    ) -> Result<Vec<RawCandidate>, SourceError> {
        self.rate_limiter.rate_limit().await;
        self.adapter.search_candidates(query).await
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("id", &self.id)
            .field("rate_limiter", &self.rate_limiter)
            .finish()
    }
}

/// Per-source counters, as reported by [`SourceRegistry::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    pub source: SourceId,
    #[serde(flatten)]
    pub limiter: RateLimiterStats,
}

/// Ordered lookup of the configured sources.
#[derive(Debug)]
pub struct SourceRegistry {
    sources: Vec<Arc<Source>>,
}

impl Default for SourceRegistry {
    fn default() -> Self {
        SourceRegistryBuilder::new().build()
    }
}

impl SourceRegistry {
    /// Sources are kept in [`SourceId`] order; a repeated id keeps the first.
    pub fn new(sources: Vec<Source>) -> Self {
        let mut ordered: Vec<Arc<Source>> = Vec::with_capacity(sources.len());
        for source in sources {
            if ordered.iter().any(|known| known.id == source.id) {
                debug!(source = %source.id, "ignoring duplicate source registration");
                continue;
            }
            ordered.push(Arc::new(source));
        }
        ordered.sort_by_key(|source| source.id);

        Self { sources: ordered }
    }

    pub fn builder() -> SourceRegistryBuilder {
        SourceRegistryBuilder::new()
    }

    pub fn get(&self, id: SourceId) -> Result<&Arc<Source>, FetchError> {
        self.sources
            .iter()
            .find(|source| source.id == id)
            .ok_or_else(|| self.unknown(id.as_str()))
    }

    /// Looks a source up by its name; unknown names list the supported ids.
    pub fn get_by_name(&self, name: &str) -> Result<&Arc<Source>, FetchError> {
        match name.parse::<SourceId>() {
            Ok(id) => self.get(id),
            Err(_) => Err(self.unknown(name)),
        }
    }

    pub fn sources(&self) -> impl Iterator<Item = &Arc<Source>> {
        self.sources.iter()
    }

    pub fn ids(&self) -> Vec<SourceId> {
        self.sources.iter().map(|source| source.id).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn reset_rate_limiters(&self) {
        for source in &self.sources {
            source.rate_limiter.reset();
        }
    }

    pub fn stats(&self) -> Vec<SourceStats> {
        self.sources
            .iter()
            .map(|source| SourceStats {
                source: source.id,
                limiter: source.rate_limiter.stats(),
            })
            .collect()
    }

    fn unknown(&self, requested: &str) -> FetchError {
        FetchError::UnknownSource {
            requested: requested.to_owned(),
            supported: self.ids(),
        }
    }
}

/// Builder for [`SourceRegistry`].
pub struct SourceRegistryBuilder {
    enable_yahoo: bool,
    enable_coingecko: bool,
    use_env_overrides: bool,
    policies: HashMap<SourceId, SourcePolicy>,
    adapters: Vec<Arc<dyn SourceAdapter>>,
    http_client: Option<Arc<dyn HttpClient>>,
}

impl Default for SourceRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceRegistryBuilder {
    pub fn new() -> Self {
        Self {
            enable_yahoo: true,
            enable_coingecko: true,
            use_env_overrides: false,
            policies: HashMap::new(),
            adapters: Vec::new(),
            http_client: None,
        }
    }

    pub fn with_yahoo_enabled(mut self, enabled: bool) -> Self {
        self.enable_yahoo = enabled;
        self
    }

    pub fn with_coingecko_enabled(mut self, enabled: bool) -> Self {
        self.enable_coingecko = enabled;
        self
    }

    /// Replaces the default policy of `policy.source_id`.
    pub fn with_policy(mut self, policy: SourcePolicy) -> Self {
        self.policies.insert(policy.source_id, policy);
        self
    }

    /// Applies `PRICESCOUT_<SOURCE>_WAIT_MS` / `_BACKOFF_MS` on top of the
    /// configured policies at build time.
    pub fn with_env_overrides(mut self) -> Self {
        self.use_env_overrides = true;
        self
    }

    /// Transport shared by the built-in adapters.
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Registers a custom adapter. It replaces the built-in adapter with the
    /// same id, which is then considered enabled.
    pub fn with_adapter(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.adapters.push(adapter);
        self
    }

    pub fn build(self) -> SourceRegistry {
        let http_client = self
            .http_client
            .clone()
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));

        let mut adapters = self.adapters.clone();
        let has_custom = |id: SourceId| adapters.iter().any(|adapter| adapter.id() == id);

        let mut built_in: Vec<Arc<dyn SourceAdapter>> = Vec::new();
        if self.enable_yahoo && !has_custom(SourceId::Yahoo) {
            built_in.push(Arc::new(YahooSource::with_http_client(Arc::clone(
                &http_client,
            ))));
        }
        if self.enable_coingecko && !has_custom(SourceId::Coingecko) {
            built_in.push(Arc::new(CoingeckoSource::with_http_client(Arc::clone(
                &http_client,
            ))));
        }
        adapters.extend(built_in);

        let sources = adapters
            .into_iter()
            .map(|adapter| {
                let policy = self.policy_for(adapter.id());
                Source::new(adapter, &policy)
            })
            .collect();

        SourceRegistry::new(sources)
    }

    fn policy_for(&self, id: SourceId) -> SourcePolicy {
        let policy = self
            .policies
            .get(&id)
            .copied()
            .unwrap_or_else(|| SourcePolicy::default_for(id));
        if self.use_env_overrides {
            policy.with_env_overrides()
        } else {
            policy
        }
    }
}
