//! # Pricescout Core
//!
//! Symbol search and historical price lookup across rate-limited public
//! market-data sources.
//!
//! ## Overview
//!
//! - **Sources** wrap an adapter (Yahoo Finance, CoinGecko) with their own
//!   rate limiter and back-off state
//! - **Resilient fetching** retries transient failures and backs off on
//!   rate-limit signals, within a bounded attempt budget
//! - **Search** fans out to all sources in parallel, then deduplicates,
//!   ranks and buckets the hits
//! - **Price resolution** picks the price nearest to a date, optionally
//!   bounded or exact
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo and CoinGecko adapters |
//! | [`cache`] | In-memory price history cache |
//! | [`data_source`] | Adapter trait, source errors, raw candidates |
//! | [`domain`] | Symbols, price histories, currencies, timestamps |
//! | [`error`] | Validation, fetch and price errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`price`] | Price-point resolution and the price service |
//! | [`registry`] | Sources and the source registry |
//! | [`retry`] | Retry policy and resilient fetch loop |
//! | [`search`] | Matching, ranking, filtering, aggregation |
//! | [`source`] | Source identifiers |
//! | [`source_policy`] | Per-source pacing configuration |
//! | [`throttling`] | Rate limiter |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pricescout_core::{PriceRequest, PriceService, SearchAggregator, SourceRegistry, UtcDateTime};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(SourceRegistry::builder().with_env_overrides().build());
//!
//!     let result = SearchAggregator::new(registry.clone()).search("bitcoin").await?;
//!     let best = result.symbols().first().ok_or("no hits")?;
//!
//!     let prices = PriceService::new(registry);
//!     let point = prices
//!         .price_point(&PriceRequest::for_symbol(best), UtcDateTime::parse("2018-01-11")?, None)
//!         .await?;
//!     println!("{point}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐
//! │ SearchAggregator │   │  PriceService    │──▶ PriceCache
//! └────────┬─────────┘   └────────┬─────────┘
//!          └──────────┬───────────┘
//!                     ▼
//!          ┌──────────────────────┐
//!          │  ResilientFetcher    │  retry / back-off
//!          └──────────┬───────────┘
//!                     ▼
//!          ┌──────────────────────┐     ┌─────────────┐
//!          │ SourceRegistry       │────▶│ RateLimiter │ one per source
//!          │  └ Source            │     └─────────────┘
//!          └──────────┬───────────┘
//!                     ▼
//!          ┌──────────────────────┐     ┌─────────────┐
//!          │ SourceAdapter        │────▶│ HttpClient  │
//!          └──────────────────────┘     └─────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Adapters report [`SourceError`]s; the fetch loop decides from the kind:
//!
//! ```rust
//! use pricescout_core::{SourceError, SourceErrorKind};
//!
//! fn describe(error: &SourceError) -> &'static str {
//!     match error.kind() {
//!         SourceErrorKind::Transient => "retried immediately",
//!         SourceErrorKind::RateLimited => "retried after back-off",
//!         _ => "returned to the caller",
//!     }
//! }
//! ```

pub mod adapters;
pub mod cache;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod price;
pub mod registry;
pub mod retry;
pub mod search;
pub mod source;
pub mod source_policy;
pub mod throttling;

// Adapter implementations
pub use adapters::{CoingeckoSource, YahooSource};

// Caching
pub use cache::{CacheMode, PriceCache, PriceCacheKey};

// Adapter trait and types
pub use data_source::{RawCandidate, SourceAdapter, SourceError, SourceErrorKind, SourceFuture};

// Domain models
pub use domain::{
    validate_currency_code, AssetClass, CurrencyPreference, PriceEntry, PriceHistory, PricePoint,
    Symbol, SymbolAttributes, SymbolQuery, UtcDateTime,
};

// Error types
pub use error::{FetchError, PriceError, ValidationError};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, ScriptedHttpClient,
};

// Prices
pub use price::{resolve, resolve_latest, resolve_strict, PriceRequest, PriceService};

// Sources
pub use registry::{Source, SourceRegistry, SourceRegistryBuilder, SourceStats};
pub use source::SourceId;
pub use source_policy::SourcePolicy;

// Retry logic
pub use retry::{ResilientFetcher, RetryPolicy};

// Search
pub use search::{
    Bucket, MatchKind, SearchAggregator, SearchResult, SourceFailure, SymbolFilter,
};

// Throttling
pub use throttling::{RateLimiter, RateLimiterStats};
