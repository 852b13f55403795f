//! Retry loop wrapped around every paced source call.
//!
//! | Failure | Reaction |
//! |---------|----------|
//! | [`SourceErrorKind::Transient`] | retry right away (pacing still applies) |
//! | [`SourceErrorKind::RateLimited`] | back off, doubling the pause each time |
//! | anything else | returned immediately |
//!
//! Both retry paths share one attempt budget. A success resets the source's
//! back-off time.

use std::future::Future;

use tracing::{debug, warn};

use crate::data_source::{RawCandidate, SourceError, SourceErrorKind};
use crate::registry::Source;
use crate::{CurrencyPreference, FetchError, PriceHistory, SymbolQuery};

pub const DEFAULT_MAX_TRIES: u32 = 100;

/// Attempt budget for one logical fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_tries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_tries: DEFAULT_MAX_TRIES,
        }
    }
}

impl RetryPolicy {
    /// `max_tries` is clamped to at least one attempt.
    pub fn new(max_tries: u32) -> Self {
        Self {
            max_tries: max_tries.max(1),
        }
    }

    pub fn no_retry() -> Self {
        Self::new(1)
    }
}

/// Runs source calls under a [`RetryPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResilientFetcher {
    policy: RetryPolicy,
}

impl ResilientFetcher {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetches a price history, retrying transient and rate-limit failures.
    pub async fn price_history(
        &self,
        source: &Source,
        query: &SymbolQuery,
        currency: &CurrencyPreference,
    ) -> Result<PriceHistory, FetchError> {
        self.run(source, move || source.fetch_price_history(query, currency))
            .await
    }

    /// Fetches search candidates, retrying transient and rate-limit failures.
    pub async fn search_candidates(
        &self,
        source: &Source,
        query: &str,
    ) -> Result<Vec<RawCandidate>, FetchError> {
        self.run(source, move || source.fetch_search_candidates(query))
            .await
    }

    /// Drives `attempt` until it succeeds, fails permanently, or the attempt
    /// budget is spent. `attempt` must perform exactly one paced call.
    pub async fn run<T, F, Fut>(&self, source: &Source, mut attempt: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let max_tries = self.policy.max_tries;
        let mut tries: u32 = 0;

        loop {
            tries += 1;
            let error = match attempt().await {
                Ok(value) => {
                    if tries > 1 {
                        debug!(source = %source.id(), attempts = tries, "source call recovered");
                    }
                    source.rate_limiter().reset_back_off();
                    return Ok(value);
                }
                Err(error) => error,
            };

            match error.kind() {
                SourceErrorKind::Transient => {
                    warn!(
                        source = %source.id(),
                        attempt = tries,
                        max_tries,
                        error = %error,
                        "transient source failure"
                    );
                    if tries >= max_tries {
                        return Err(exhausted(source, tries, error));
                    }
                }
                SourceErrorKind::RateLimited => {
                    if tries >= max_tries {
                        return Err(exhausted(source, tries, error));
                    }
                    let pause = source.rate_limiter().back_off_time();
                    warn!(
                        source = %source.id(),
                        attempt = tries,
                        back_off_ms = u64::try_from(pause.as_millis()).unwrap_or(u64::MAX),
                        "rate limited by source, backing off"
                    );
                    source.rate_limiter().back_off().await;
                }
                _ => return Err(FetchError::Source(error)),
            }
        }
    }
}

fn exhausted(source: &Source, attempts: u32, last: SourceError) -> FetchError {
    FetchError::RetryExhausted {
        source_id: source.id(),
        attempts,
        last,
    }
}
