//! In-memory cache of fetched price histories.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{CurrencyPreference, PriceHistory, SourceId, SymbolQuery, ValidationError};

/// How a price lookup uses the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Serve a fresh cached history when present, otherwise fetch and store.
    #[default]
    Use,
    /// Always fetch, then store the new history.
    Refresh,
    /// Always fetch and leave the cache untouched.
    Bypass,
}

impl CacheMode {
    pub const fn reads(self) -> bool {
        matches!(self, Self::Use)
    }

    pub const fn writes(self) -> bool {
        !matches!(self, Self::Bypass)
    }
}

impl FromStr for CacheMode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "use" => Ok(Self::Use),
            "refresh" => Ok(Self::Refresh),
            "bypass" => Ok(Self::Bypass),
            other => Err(ValidationError::InvalidCacheMode {
                value: other.to_owned(),
            }),
        }
    }
}

/// Identity of one cached history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceCacheKey {
    source: SourceId,
    query: String,
    currency: String,
}

impl PriceCacheKey {
    pub fn new(source: SourceId, query: &SymbolQuery, currency: &CurrencyPreference) -> Self {
        Self {
            source,
            query: query.to_string(),
            currency: currency.as_str().to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    history: PriceHistory,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<PriceCacheKey, CacheEntry>,
    ttl: Duration,
}

/// Thread-safe TTL cache shared by clones.
#[derive(Debug, Clone)]
pub struct PriceCache {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::with_default_ttl()
    }
}

impl PriceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner {
                map: HashMap::new(),
                ttl,
            })),
        }
    }

    /// Daily series change at most once a day; an hour keeps repeated lookups
    /// within a session off the network.
    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(3_600))
    }

    /// A zero TTL stores nothing.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub async fn get(&self, key: &PriceCacheKey) -> Option<PriceHistory> {
        let store = self.inner.read().await;
        store
            .map
            .get(key)
            .filter(|entry| Instant::now() <= entry.expires_at)
            .map(|entry| entry.history.clone())
    }

    /// Stores `history` and evicts every entry that has expired.
    pub async fn put(&self, key: PriceCacheKey, history: PriceHistory) {
        let mut store = self.inner.write().await;
        let now = Instant::now();
        store.map.retain(|_, entry| entry.expires_at > now);
        if store.ttl == Duration::ZERO {
            return;
        }
        let expires_at = now + store.ttl;
        store.map.insert(key, CacheEntry { history, expires_at });
    }

    pub async fn clear_expired(&self) {
        let now = Instant::now();
        self.inner
            .write()
            .await
            .map
            .retain(|_, entry| entry.expires_at > now);
    }

    pub async fn clear(&self) {
        self.inner.write().await.map.clear();
    }

    /// Number of entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
