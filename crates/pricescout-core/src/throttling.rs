//! Per-source pacing and exponential back-off.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::Quota;
use serde::Serialize;
use tracing::{debug, warn};

use crate::source_policy::SourcePolicy;

type Pacer = governor::RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Snapshot of a limiter's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimiterStats {
    pub wait_ms: u64,
    pub back_off_ms: u64,
    pub count_all_calls: u64,
    pub count_limited_calls: u64,
}

/// Enforces a minimum gap between calls to one source and keeps that source's
/// back-off state.
///
/// Calls are serialized: concurrent callers of [`rate_limit`](Self::rate_limit)
/// and [`back_off`](Self::back_off) take turns, so consecutive calls are always
/// at least `wait` apart. Limiters of different sources never block each other.
pub struct RateLimiter {
    wait: Duration,
    initial_back_off: Duration,
    turn: tokio::sync::Mutex<()>,
    state: Mutex<LimiterState>,
}

struct LimiterState {
    pacer: Option<Arc<Pacer>>,
    last_call: Option<Instant>,
    count_all_calls: u64,
    count_limited_calls: u64,
    back_off_time: Duration,
}

impl LimiterState {
    fn fresh(wait: Duration, initial_back_off: Duration) -> Self {
        Self {
            pacer: Quota::with_period(wait).map(|quota| Arc::new(Pacer::direct(quota))),
            last_call: None,
            count_all_calls: 0,
            count_limited_calls: 0,
            back_off_time: initial_back_off,
        }
    }
}

impl RateLimiter {
    /// A zero `wait` disables pacing.
    pub fn new(wait: Duration, initial_back_off: Duration) -> Self {
        Self {
            wait,
            initial_back_off,
            turn: tokio::sync::Mutex::new(()),
            state: Mutex::new(LimiterState::fresh(wait, initial_back_off)),
        }
    }

    pub fn from_policy(policy: &SourcePolicy) -> Self {
        Self::new(policy.wait, policy.initial_back_off)
    }

    /// Waits until `wait` has elapsed since the previous call, then records
    /// this call.
    pub async fn rate_limit(&self) {
        let _turn = self.turn.lock().await;
        let pacer = self.lock_state().pacer.clone();

        let mut throttled = false;
        if let Some(pacer) = pacer {
            if pacer.check().is_err() {
                throttled = true;
                debug!(wait_ms = duration_ms(self.wait), "throttling call");
                pacer.until_ready().await;
            }
        }

        let mut state = self.lock_state();
        state.last_call = Some(Instant::now());
        state.count_all_calls += 1;
        if throttled {
            state.count_limited_calls += 1;
        }
    }

    /// Sleeps for the current back-off time, then doubles it.
    pub async fn back_off(&self) {
        let _turn = self.turn.lock().await;
        let pause = self.back_off_time();
        tokio::time::sleep(pause).await;
        self.lock_state().back_off_time = pause.saturating_mul(2);
    }

    /// Restores the back-off time to its initial value.
    pub fn reset_back_off(&self) {
        self.lock_state().back_off_time = self.initial_back_off;
    }

    /// Forgets every recorded call and resets counters and back-off.
    pub fn reset(&self) {
        *self.lock_state() = LimiterState::fresh(self.wait, self.initial_back_off);
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    pub fn initial_back_off(&self) -> Duration {
        self.initial_back_off
    }

    pub fn back_off_time(&self) -> Duration {
        self.lock_state().back_off_time
    }

    /// `None` until the first call.
    pub fn last_call(&self) -> Option<Instant> {
        self.lock_state().last_call
    }

    pub fn count_all_calls(&self) -> u64 {
        self.lock_state().count_all_calls
    }

    pub fn count_limited_calls(&self) -> u64 {
        self.lock_state().count_limited_calls
    }

    pub fn stats(&self) -> RateLimiterStats {
        let state = self.lock_state();
        RateLimiterStats {
            wait_ms: duration_ms(self.wait),
            back_off_ms: duration_ms(state.back_off_time),
            count_all_calls: state.count_all_calls,
            count_limited_calls: state.count_limited_calls,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, LimiterState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("rate limiter state lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("wait", &self.wait)
            .field("initial_back_off", &self.initial_back_off)
            .field("stats", &self.stats())
            .finish()
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
