//! In-memory TTL cache for provider fetches.
//!
//! Entries are keyed by `(ticker, period, provider)` and expire after a fixed
//! time-to-live. Only successful fetches are stored; a failed call is retried
//! on the next request. Synthetic data is never cached.

use crate::domain::{OhlcvSeries, Period, ProviderId};
use moka::sync::Cache;
use std::fmt;
use std::time::Duration;

/// Default lifetime of a cached fetch.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    ticker: String,
    period: Period,
    provider: ProviderId,
}

/// Thread-safe fetch cache; expired entries are evicted by the cache itself.
pub struct FetchCache {
    ttl: Duration,
    entries: Cache<CacheKey, OhlcvSeries>,
}

impl fmt::Debug for FetchCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl Default for FetchCache {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }
}

impl FetchCache {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Cache::builder().time_to_live(ttl).build(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn key(ticker: &str, period: Period, provider: ProviderId) -> CacheKey {
        CacheKey {
            ticker: ticker.trim().to_ascii_uppercase(),
            period,
            provider,
        }
    }

    /// Cached series if present and not expired.
    pub fn get(&self, ticker: &str, period: Period, provider: ProviderId) -> Option<OhlcvSeries> {
        self.entries.get(&Self::key(ticker, period, provider))
    }

    pub fn insert(&self, ticker: &str, period: Period, provider: ProviderId, series: OhlcvSeries) {
        self.entries.insert(Self::key(ticker, period, provider), series);
    }

    /// Number of stored entries after pending evictions have run.
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        self.entries.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
    }
}
