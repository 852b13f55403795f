//! Built-in source adapters.
//!
//! Both adapters talk HTTP through an injectable [`HttpClient`], so they run
//! against canned responses in tests and against reqwest in production.
//!
//! | Adapter | Prices | Search |
//! |---------|--------|--------|
//! | [`YahooSource`] | daily chart since 2000-01-01, in the ticker's own currency | search endpoint quotes |
//! | [`CoingeckoSource`] | daily market chart in the preferred currency | substring filter over the coin list |
//!
//! [`HttpClient`]: crate::http_client::HttpClient

mod coingecko;
mod yahoo;

pub use coingecko::CoingeckoSource;
pub use yahoo::YahooSource;

use crate::data_source::SourceError;
use crate::http_client::{HttpError, HttpResponse};
use crate::SourceId;

/// Maps non-success statuses shared by all sources. `None` for 2xx and for
/// statuses the caller must interpret itself (400 and 404).
fn classify_status(source: SourceId, response: &HttpResponse) -> Option<SourceError> {
    match response.status {
        status if (200..300).contains(&status) => None,
        400 | 404 => None,
        429 => Some(SourceError::rate_limited(format!(
            "{source} returned status 429"
        ))),
        408 | 500..=599 => Some(SourceError::transient(format!(
            "{source} returned status {}",
            response.status
        ))),
        status => Some(SourceError::internal(format!(
            "{source} returned unexpected status {status}"
        ))),
    }
}

fn transport_error(source: SourceId, error: HttpError) -> SourceError {
    if error.retryable() {
        SourceError::transient(format!("{source} transport error: {}", error.message()))
    } else {
        SourceError::internal(format!("{source} request rejected: {}", error.message()))
    }
}

fn parse_error(source: SourceId, error: serde_json::Error) -> SourceError {
    SourceError::internal(format!("failed to parse {source} response: {error}"))
}
