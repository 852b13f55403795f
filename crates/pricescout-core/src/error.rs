use thiserror::Error;

use crate::data_source::SourceError;
use crate::{SourceId, UtcDateTime};

/// Validation and contract errors exposed by `pricescout-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol name cannot be empty")]
    EmptySymbolName,
    #[error("search query cannot be empty")]
    EmptyQuery,

    #[error("invalid source '{value}', expected one of yahoo, coingecko")]
    InvalidSource { value: String },
    #[error("invalid asset class '{value}'")]
    InvalidAssetClass { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z) or YYYY-MM-DD: '{value}'")]
    InvalidTimestamp { value: String },

    #[error("invalid cache mode '{value}', expected one of use, refresh, bypass")]
    InvalidCacheMode { value: String },

    #[error("currency must be a 3 to 5 character alphanumeric code: '{value}'")]
    InvalidCurrency { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("price series timestamps must be strictly increasing (offending index {index})")]
    UnorderedSeries { index: usize },
}

/// Failures surfaced by registry lookups and the resilient fetch loop.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("unknown source '{requested}', supported sources are: {}", join_ids(.supported))]
    UnknownSource {
        requested: String,
        supported: Vec<SourceId>,
    },

    #[error("source '{source_id}' still failing after {attempts} attempts, last error: {last}")]
    RetryExhausted {
        source_id: SourceId,
        attempts: u32,
        last: SourceError,
    },

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl FetchError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownSource { .. } => "source.unknown",
            Self::RetryExhausted { .. } => "source.retry_exhausted",
            Self::Source(error) => error.code(),
        }
    }
}

/// Errors produced while resolving a single price point.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("price history is empty")]
    EmptyHistory,

    #[error("no price within {max} of {requested}, nearest is {nearest} ({deviation} away)")]
    OutOfBound {
        requested: UtcDateTime,
        nearest: UtcDateTime,
        deviation: time::Duration,
        max: time::Duration,
    },

    #[error("no price recorded exactly at {requested}")]
    ExactPriceMissing { requested: UtcDateTime },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

fn join_ids(ids: &[SourceId]) -> String {
    ids.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
