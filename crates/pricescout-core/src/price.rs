//! Price-point resolution over a [`PriceHistory`], and the service that
//! fetches histories through the registry.

use std::sync::Arc;

use time::{Date, Duration};
use tracing::debug;

use crate::cache::{CacheMode, PriceCache, PriceCacheKey};
use crate::retry::ResilientFetcher;
use crate::{
    CurrencyPreference, PriceEntry, PriceError, PriceHistory, PricePoint, SourceId,
    SourceRegistry, Symbol, SymbolQuery, UtcDateTime,
};

/// Picks the entry whose UTC calendar day is nearest to the day of `when`.
/// The time of day is ignored on both sides, so daily bars stamped at market
/// open still resolve for a bare date. On an exact tie the earlier day wins.
///
/// With `max_deviation` set, an entry more whole days away than that fails
/// with [`PriceError::OutOfBound`].
pub fn resolve(
    history: &PriceHistory,
    when: UtcDateTime,
    max_deviation: Option<Duration>,
) -> Result<PricePoint, PriceError> {
    let entry = nearest_entry(history.series(), when.date()).ok_or(PriceError::EmptyHistory)?;

    if let Some(max) = max_deviation {
        let deviation = day_distance(entry.ts.date(), when.date());
        if deviation.whole_days() > max.whole_days() {
            return Err(PriceError::OutOfBound {
                requested: when,
                nearest: entry.ts,
                deviation,
                max,
            });
        }
    }

    Ok(PricePoint::new(entry.ts, entry.close, history.currency()))
}

/// Only an entry recorded on the same UTC day as `when` is accepted.
pub fn resolve_strict(history: &PriceHistory, when: UtcDateTime) -> Result<PricePoint, PriceError> {
    resolve(history, when, Some(Duration::ZERO)).map_err(|error| match error {
        PriceError::OutOfBound { requested, .. } => PriceError::ExactPriceMissing { requested },
        PriceError::EmptyHistory => PriceError::ExactPriceMissing { requested: when },
        other => other,
    })
}

pub fn resolve_latest(history: &PriceHistory) -> Result<PricePoint, PriceError> {
    history
        .last()
        .map(|entry| PricePoint::new(entry.ts, entry.close, history.currency()))
        .ok_or(PriceError::EmptyHistory)
}

fn day_distance(a: Date, b: Date) -> Duration {
    (a - b).abs()
}

fn nearest_entry(series: &[PriceEntry], day: Date) -> Option<&PriceEntry> {
    let split = series.partition_point(|entry| entry.ts.date() < day);
    let before = split.checked_sub(1).and_then(|index| series.get(index));
    let after = series.get(split);

    match (before, after) {
        (Some(before), Some(after)) => {
            if day_distance(day, before.ts.date()) <= day_distance(after.ts.date(), day) {
                Some(before)
            } else {
                Some(after)
            }
        }
        (before, after) => before.or(after),
    }
}

/// What to price: a query on one source, in a preferred currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRequest {
    pub query: SymbolQuery,
    pub source: SourceId,
    pub currency: CurrencyPreference,
}

impl PriceRequest {
    pub fn new(query: impl Into<SymbolQuery>, source: SourceId) -> Self {
        Self {
            query: query.into(),
            source,
            currency: CurrencyPreference::default(),
        }
    }

    pub fn for_symbol(symbol: &Symbol) -> Self {
        Self::new(symbol.query().clone(), symbol.source())
    }

    pub fn with_currency(mut self, currency: CurrencyPreference) -> Self {
        self.currency = currency;
        self
    }
}

/// Fetches histories through the registry's resilient path and resolves
/// price points from them.
#[derive(Debug, Clone)]
pub struct PriceService {
    registry: Arc<SourceRegistry>,
    fetcher: ResilientFetcher,
    cache: PriceCache,
    cache_mode: CacheMode,
}

impl PriceService {
    pub fn new(registry: Arc<SourceRegistry>) -> Self {
        Self {
            registry,
            fetcher: ResilientFetcher::default(),
            cache: PriceCache::default(),
            cache_mode: CacheMode::default(),
        }
    }

    pub fn with_fetcher(mut self, fetcher: ResilientFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_cache(mut self, cache: PriceCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = cache_mode;
        self
    }

    pub fn registry(&self) -> &Arc<SourceRegistry> {
        &self.registry
    }

    pub async fn price_history(&self, request: &PriceRequest) -> Result<PriceHistory, PriceError> {
        let key = PriceCacheKey::new(request.source, &request.query, &request.currency);

        if self.cache_mode.reads() {
            if let Some(history) = self.cache.get(&key).await {
                debug!(source = %request.source, query = %request.query, "price history cache hit");
                return Ok(history);
            }
        }

        let source = self.registry.get(request.source)?;
        let history = self
            .fetcher
            .price_history(source, &request.query, &request.currency)
            .await?;

        if self.cache_mode.writes() {
            self.cache.put(key, history.clone()).await;
        }
        Ok(history)
    }

    /// Price nearest to `when`, optionally bounded by `max_deviation`.
    pub async fn price_point(
        &self,
        request: &PriceRequest,
        when: UtcDateTime,
        max_deviation: Option<Duration>,
    ) -> Result<PricePoint, PriceError> {
        let history = self.price_history(request).await?;
        resolve(&history, when, max_deviation)
    }

    pub async fn price_point_strict(
        &self,
        request: &PriceRequest,
        when: UtcDateTime,
    ) -> Result<PricePoint, PriceError> {
        let history = self.price_history(request).await?;
        resolve_strict(&history, when)
    }

    pub async fn price_latest(&self, request: &PriceRequest) -> Result<PricePoint, PriceError> {
        let history = self.price_history(request).await?;
        resolve_latest(&history)
    }
}
