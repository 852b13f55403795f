//! Source adapter trait and the error/candidate types it exchanges.
//!
//! An adapter performs the raw network calls for one source. It never throttles
//! or retries on its own: pacing lives in [`crate::throttling::RateLimiter`] and
//! retries in [`crate::retry::ResilientFetcher`], both driven by the
//! [`crate::registry::Source`] wrapping the adapter.
//!
//! | Operation | Output | Description |
//! |-----------|--------|-------------|
//! | [`price_history`](SourceAdapter::price_history) | [`PriceHistory`] | Full daily history for a query |
//! | [`search_candidates`](SourceAdapter::search_candidates) | [`RawCandidate`]s | Unranked hits for a search text |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{
    CurrencyPreference, PriceHistory, SourceId, Symbol, SymbolAttributes, SymbolQuery,
    ValidationError,
};

/// Boxed future returned by adapter operations.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Category of a source failure. Drives the retry decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorKind {
    SymbolNotFound,
    CurrencyNotSupported,
    RateLimited,
    Transient,
    InvalidRequest,
    Internal,
}

/// Structured source error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn symbol_not_found(source: SourceId, query: impl Display) -> Self {
        Self {
            kind: SourceErrorKind::SymbolNotFound,
            message: format!("source '{source}' has no data for '{query}'"),
        }
    }

    pub fn currency_not_supported(source: SourceId, currency: impl Display) -> Self {
        Self {
            kind: SourceErrorKind::CurrencyNotSupported,
            message: format!("source '{source}' cannot quote prices in '{currency}'"),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Transient,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Rate limits and transient failures are retried; everything else
    /// propagates on first occurrence.
    pub const fn retryable(&self) -> bool {
        matches!(
            self.kind,
            SourceErrorKind::RateLimited | SourceErrorKind::Transient
        )
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::SymbolNotFound => "source.symbol_not_found",
            SourceErrorKind::CurrencyNotSupported => "source.currency_not_supported",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Transient => "source.transient",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(value: ValidationError) -> Self {
        Self::internal(format!("source returned malformed data: {value}"))
    }
}

/// Unranked search hit as reported by a source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCandidate {
    pub name: String,
    /// Defaults to `name` when absent.
    pub query: Option<SymbolQuery>,
    pub aliases: Vec<String>,
    pub attributes: SymbolAttributes,
}

impl RawCandidate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, query: impl Into<SymbolQuery>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_attributes(mut self, attributes: SymbolAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn into_symbol(self, source: SourceId) -> Result<Symbol, ValidationError> {
        let mut symbol = Symbol::new(self.name, source)?
            .with_aliases(self.aliases)
            .with_attributes(self.attributes);
        if let Some(query) = self.query {
            symbol = symbol.with_query(query);
        }
        Ok(symbol)
    }
}

/// Source adapter contract.
///
/// Implementations must be `Send + Sync`; the registry shares them across
/// concurrently running searches and price fetches.
pub trait SourceAdapter: Send + Sync {
    fn id(&self) -> SourceId;

    /// Fetches the full daily price history for `query`.
    ///
    /// `currency` is a preference. The returned history carries the currency
    /// the prices are actually in.
    fn price_history<'a>(
        &'a self,
        query: &'a SymbolQuery,
        currency: &'a CurrencyPreference,
    ) -> SourceFuture<'a, PriceHistory>;

    /// Returns every candidate the source considers a hit for `query`.
    fn search_candidates<'a>(&'a self, query: &'a str) -> SourceFuture<'a, Vec<RawCandidate>>;
}
