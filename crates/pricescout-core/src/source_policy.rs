use std::time::Duration;

use crate::SourceId;

/// Back-off starting point shared by all sources.
pub const DEFAULT_INITIAL_BACK_OFF: Duration = Duration::from_secs(10);

/// Pacing configuration for one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePolicy {
    pub source_id: SourceId,
    /// Minimum gap between two calls to the source.
    pub wait: Duration,
    /// First back-off pause after a rate-limit signal.
    pub initial_back_off: Duration,
}

impl SourcePolicy {
    pub const fn new(source_id: SourceId, wait: Duration, initial_back_off: Duration) -> Self {
        Self {
            source_id,
            wait,
            initial_back_off,
        }
    }

    pub const fn yahoo_default() -> Self {
        Self::new(
            SourceId::Yahoo,
            Duration::from_millis(500),
            DEFAULT_INITIAL_BACK_OFF,
        )
    }

    pub const fn coingecko_default() -> Self {
        Self::new(
            SourceId::Coingecko,
            Duration::from_millis(2_500),
            DEFAULT_INITIAL_BACK_OFF,
        )
    }

    pub const fn default_for(source_id: SourceId) -> Self {
        match source_id {
            SourceId::Yahoo => Self::yahoo_default(),
            SourceId::Coingecko => Self::coingecko_default(),
        }
    }

    pub const fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub const fn with_initial_back_off(mut self, initial_back_off: Duration) -> Self {
        self.initial_back_off = initial_back_off;
        self
    }

    /// Applies `PRICESCOUT_<SOURCE>_WAIT_MS` and `PRICESCOUT_<SOURCE>_BACKOFF_MS`
    /// when set to a valid number of milliseconds.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    pub(crate) fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let token = self.source_id.env_token();
        if let Some(wait) = millis_from(&lookup, &format!("PRICESCOUT_{token}_WAIT_MS")) {
            self.wait = wait;
        }
        if let Some(back_off) = millis_from(&lookup, &format!("PRICESCOUT_{token}_BACKOFF_MS")) {
            self.initial_back_off = back_off;
        }
        self
    }
}

fn millis_from(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<Duration> {
    let raw = lookup(name)?;
    match raw.trim().parse::<u64>() {
        Ok(millis) => Some(Duration::from_millis(millis)),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "ignoring non-numeric duration override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_source_tolerance() {
        let yahoo = SourcePolicy::default_for(SourceId::Yahoo);
        let coingecko = SourcePolicy::default_for(SourceId::Coingecko);

        assert_eq!(yahoo.wait, Duration::from_millis(500));
        assert_eq!(coingecko.wait, Duration::from_millis(2_500));
        assert_eq!(yahoo.initial_back_off, Duration::from_secs(10));
        assert_eq!(coingecko.initial_back_off, Duration::from_secs(10));
    }

    #[test]
    fn overrides_apply_per_source() {
        let lookup = |name: &str| match name {
            "PRICESCOUT_COINGECKO_WAIT_MS" => Some(String::from("6000")),
            "PRICESCOUT_COINGECKO_BACKOFF_MS" => Some(String::from("abc")),
            "PRICESCOUT_YAHOO_WAIT_MS" => Some(String::from("1")),
            _ => None,
        };

        let policy = SourcePolicy::coingecko_default().with_overrides_from(lookup);

        assert_eq!(policy.wait, Duration::from_secs(6));
        assert_eq!(policy.initial_back_off, DEFAULT_INITIAL_BACK_OFF);
    }
}
