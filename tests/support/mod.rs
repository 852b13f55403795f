//! Shared stub adapter for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pricescout_core::{
    CurrencyPreference, PriceHistory, RawCandidate, ScriptedHttpClient, SourceAdapter, SourceError,
    SourceFuture, SourceId, SourcePolicy, SourceRegistry, SymbolQuery, UtcDateTime,
};

type Scripted<T> = Mutex<VecDeque<Result<T, SourceError>>>;

/// Adapter that replays scripted outcomes; the last outcome repeats.
pub struct StubAdapter {
    id: SourceId,
    histories: Scripted<PriceHistory>,
    candidates: Scripted<Vec<RawCandidate>>,
    history_calls: AtomicUsize,
    search_calls: AtomicUsize,
}

impl StubAdapter {
    pub fn new(id: SourceId) -> Self {
        Self {
            id,
            histories: Mutex::new(VecDeque::new()),
            candidates: Mutex::new(VecDeque::new()),
            history_calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_history(self, outcome: Result<PriceHistory, SourceError>) -> Self {
        self.histories.lock().expect("lock").push_back(outcome);
        self
    }

    pub fn with_candidates(self, outcome: Result<Vec<RawCandidate>, SourceError>) -> Self {
        self.candidates.lock().expect("lock").push_back(outcome);
        self
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    fn next<T: Clone>(queue: &Scripted<T>) -> Result<T, SourceError> {
        let mut queue = queue.lock().expect("lock");
        if queue.len() > 1 {
            queue.pop_front().expect("non-empty")
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(SourceError::internal("nothing scripted")))
        }
    }
}

impl SourceAdapter for StubAdapter {
    fn id(&self) -> SourceId {
        self.id
    }

    fn price_history<'a>(
        &'a self,
        _query: &'a SymbolQuery,
        _currency: &'a CurrencyPreference,
    ) -> SourceFuture<'a, PriceHistory> {
        Box::pin(async move {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            Self::next(&self.histories)
        })
    }

    fn search_candidates<'a>(&'a self, _query: &'a str) -> SourceFuture<'a, Vec<RawCandidate>> {
        Box::pin(async move {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            Self::next(&self.candidates)
        })
    }
}

/// Policy with no pacing and the given back-off.
pub fn unpaced(id: SourceId, back_off: Duration) -> SourcePolicy {
    SourcePolicy::default_for(id)
        .with_wait(Duration::ZERO)
        .with_initial_back_off(back_off)
}

/// Registry holding only the given stubs, unpaced, without network access.
pub fn registry_with(stubs: Vec<Arc<StubAdapter>>) -> Arc<SourceRegistry> {
    let mut builder = SourceRegistry::builder()
        .with_yahoo_enabled(false)
        .with_coingecko_enabled(false)
        .with_http_client(Arc::new(ScriptedHttpClient::new()));
    for stub in stubs {
        builder = builder
            .with_policy(unpaced(stub.id, Duration::from_millis(5)))
            .with_adapter(stub);
    }
    Arc::new(builder.build())
}

pub fn ts(input: &str) -> UtcDateTime {
    UtcDateTime::parse(input).expect("valid timestamp")
}

/// Prices 1, 2 and 3 on 2017-01-11, 2018-01-11 and 2018-01-12.
pub fn three_point_history(currency: &str) -> PriceHistory {
    PriceHistory::from_points(
        [
            (ts("2017-01-11"), 1.0),
            (ts("2018-01-11"), 2.0),
            (ts("2018-01-12"), 3.0),
        ],
        currency,
    )
    .expect("valid history")
}
