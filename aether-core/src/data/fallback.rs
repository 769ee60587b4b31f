//! Multi-provider fallback chain.
//!
//! `resolve` walks the provider slots in priority order, one attempt per
//! provider and no retries, and returns the first series that comes back.
//! Every slot considered (fetched, failed or skipped) adds exactly one entry
//! to the fetch trace. When nothing succeeds the deterministic synthetic
//! series is returned instead, so callers always get data.

use super::cache::FetchCache;
use super::provider::DataProvider;
use super::registry::{ProviderRegistry, SlotState};
use super::synthetic;
use crate::domain::{DataSource, OhlcvSeries, Period, ProviderId, SourcePreference};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    Failed,
    Skipped,
}

/// One entry in the fetch trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchAttempt {
    pub provider: ProviderId,
    pub outcome: AttemptOutcome,
    pub message: String,
}

impl fmt::Display for FetchAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = match self.outcome {
            AttemptOutcome::Success => "ok",
            AttemptOutcome::Failed => "failed",
            AttemptOutcome::Skipped => "skipped",
        };
        write!(f, "[{}] {mark}: {}", self.provider.key(), self.message)
    }
}

/// Ordered record of provider attempts. Observability only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FetchTrace {
    attempts: Vec<FetchAttempt>,
}

impl FetchTrace {
    fn push(&mut self, provider: ProviderId, outcome: AttemptOutcome, message: String) {
        self.attempts.push(FetchAttempt {
            provider,
            outcome,
            message,
        });
    }

    pub fn attempts(&self) -> &[FetchAttempt] {
        &self.attempts
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FetchAttempt> {
        self.attempts.iter()
    }
}

/// Output of `resolve`: a non-empty series, where it came from, and how.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub series: OhlcvSeries,
    pub source: DataSource,
    pub trace: FetchTrace,
}

/// Result of probing one provider with a live request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub provider: ProviderId,
    pub working: bool,
    pub message: String,
}

/// Symbol used for connection checks.
const PROBE_TICKER: &str = "AAPL";

/// Drives the provider chain and owns the fetch cache.
pub struct FallbackOrchestrator {
    registry: ProviderRegistry,
    cache: FetchCache,
    preference: SourcePreference,
}

impl FallbackOrchestrator {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            cache: FetchCache::default(),
            preference: SourcePreference::Auto,
        }
    }

    pub fn with_cache(mut self, cache: FetchCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_preference(mut self, preference: SourcePreference) -> Self {
        self.preference = preference;
        self
    }

    pub fn preference(&self) -> SourcePreference {
        self.preference
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &FetchCache {
        &self.cache
    }

    fn candidates(&self) -> Vec<ProviderId> {
        match self.preference {
            SourcePreference::Auto => ProviderId::PRIORITY.to_vec(),
            SourcePreference::Only(id) => vec![id],
        }
    }

    /// Fetch `ticker` for `period`, falling back through the chain.
    ///
    /// Never fails and never returns an empty series.
    pub fn resolve(&self, ticker: &str, period: Period) -> Resolution {
        let ticker = ticker.trim().to_ascii_uppercase();
        let mut trace = FetchTrace::default();

        for id in self.candidates() {
            let Some(slot) = self.registry.slot(id) else {
                continue;
            };
            let provider = match &slot.state {
                SlotState::Ready(provider) => provider,
                SlotState::Unavailable(reason) => {
                    tracing::info!(provider = id.key(), %reason, "provider skipped");
                    trace.push(
                        id,
                        AttemptOutcome::Skipped,
                        format!("{} skipped: {reason}", id.display_name()),
                    );
                    continue;
                }
            };

            match self.attempt(provider.as_ref(), &ticker, period) {
                Ok((series, cached)) => {
                    tracing::info!(
                        provider = id.key(),
                        ticker = %ticker,
                        bars = series.len(),
                        cached,
                        "provider returned data"
                    );
                    let message = if cached {
                        format!("{} loaded from cache", id.display_name())
                    } else {
                        format!("{} loaded successfully", id.display_name())
                    };
                    trace.push(id, AttemptOutcome::Success, message);
                    return Resolution {
                        series,
                        source: DataSource::Provider(id),
                        trace,
                    };
                }
                Err(message) => {
                    tracing::info!(provider = id.key(), ticker = %ticker, %message, "provider failed");
                    trace.push(
                        id,
                        AttemptOutcome::Failed,
                        format!("{} failed: {message}", id.display_name()),
                    );
                }
            }
        }

        tracing::warn!(
            ticker = %ticker,
            period = %period,
            "all providers unavailable, using sample data"
        );
        Resolution {
            series: synthetic::generate(&ticker, period),
            source: DataSource::SampleData,
            trace,
        }
    }

    /// One cached-or-live fetch. Empty series count as failures.
    fn attempt(
        &self,
        provider: &dyn DataProvider,
        ticker: &str,
        period: Period,
    ) -> Result<(OhlcvSeries, bool), String> {
        let id = provider.id();
        if let Some(series) = self.cache.get(ticker, period, id) {
            tracing::debug!(provider = id.key(), ticker, "cache hit");
            return Ok((series, true));
        }
        let series = provider.fetch(ticker, period).map_err(|e| e.to_string())?;
        if series.is_empty() {
            return Err("no data returned".to_string());
        }
        self.cache.insert(ticker, period, id, series.clone());
        Ok((series, false))
    }

    /// Probe each provider with a small live request.
    pub fn check_connections(&self) -> Vec<ConnectionStatus> {
        self.registry
            .slots()
            .iter()
            .map(|slot| {
                let name = slot.id.display_name();
                let (working, message) = match &slot.state {
                    SlotState::Unavailable(reason) => (false, format!("{name}: {reason}")),
                    SlotState::Ready(provider) => {
                        match provider.fetch(PROBE_TICKER, Period::OneMonth) {
                            Ok(series) if !series.is_empty() => {
                                (true, format!("{name} connection OK"))
                            }
                            Ok(_) => (false, format!("{name} returned no data")),
                            Err(e) => (false, format!("{name} request failed: {e}")),
                        }
                    }
                };
                ConnectionStatus {
                    provider: slot.id,
                    working,
                    message,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::DataError;
    use crate::data::registry::Unavailable;
    use crate::domain::Bar;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StubProvider {
        id: ProviderId,
        succeed: bool,
        calls: Arc<AtomicUsize>,
    }

    impl StubProvider {
        fn boxed(id: ProviderId, succeed: bool) -> (Box<dyn DataProvider>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let stub = StubProvider {
                id,
                succeed,
                calls: Arc::clone(&calls),
            };
            (Box::new(stub), calls)
        }
    }

    impl DataProvider for StubProvider {
        fn id(&self) -> ProviderId {
            self.id
        }

        fn fetch(&self, ticker: &str, _period: Period) -> Result<OhlcvSeries, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.succeed {
                return Err(DataError::NetworkUnreachable("connection refused".into()));
            }
            let bar = Bar {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.5,
                volume: 10,
            };
            Ok(OhlcvSeries::new(ticker, vec![bar]))
        }
    }

    #[test]
    fn primary_success_returns_immediately() {
        let (yahoo, yahoo_calls) = StubProvider::boxed(ProviderId::Yahoo, true);
        let (av, av_calls) = StubProvider::boxed(ProviderId::AlphaVantage, true);
        let registry = ProviderRegistry::empty().with_provider(yahoo).with_provider(av);
        let res = FallbackOrchestrator::new(registry).resolve("aapl", Period::OneYear);

        assert_eq!(res.source, DataSource::Provider(ProviderId::Yahoo));
        assert_eq!(res.trace.len(), 1);
        assert_eq!(res.series.ticker(), "AAPL");
        assert_eq!(yahoo_calls.load(Ordering::SeqCst), 1);
        assert_eq!(av_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn falls_through_to_secondary() {
        let (yahoo, _) = StubProvider::boxed(ProviderId::Yahoo, false);
        let (av, _) = StubProvider::boxed(ProviderId::AlphaVantage, true);
        let registry = ProviderRegistry::empty().with_provider(yahoo).with_provider(av);
        let res = FallbackOrchestrator::new(registry).resolve("MSFT", Period::OneYear);

        assert_eq!(res.source, DataSource::Provider(ProviderId::AlphaVantage));
        let outcomes: Vec<AttemptOutcome> = res.trace.iter().map(|a| a.outcome).collect();
        assert_eq!(outcomes, vec![AttemptOutcome::Failed, AttemptOutcome::Success]);
    }

    #[test]
    fn all_unavailable_yields_sample_data_with_full_trace() {
        let (yahoo, _) = StubProvider::boxed(ProviderId::Yahoo, false);
        let registry = ProviderRegistry::empty()
            .with_provider(yahoo)
            .with_unavailable(ProviderId::AlphaVantage, Unavailable::MissingCredentials);
        let res = FallbackOrchestrator::new(registry).resolve("GS", Period::SixMonths);

        assert_eq!(res.source, DataSource::SampleData);
        assert!(!res.series.is_empty());
        assert_eq!(res.trace.len(), 3);
        assert_eq!(res.trace.attempts()[1].outcome, AttemptOutcome::Skipped);
        assert!(res.trace.attempts()[1].message.contains("API key"));
    }

    #[test]
    fn forced_source_attempts_only_that_provider() {
        let (yahoo, yahoo_calls) = StubProvider::boxed(ProviderId::Yahoo, true);
        let (polygon, polygon_calls) = StubProvider::boxed(ProviderId::Polygon, false);
        let registry = ProviderRegistry::empty()
            .with_provider(yahoo)
            .with_provider(polygon);
        let res = FallbackOrchestrator::new(registry)
            .with_preference(SourcePreference::Only(ProviderId::Polygon))
            .resolve("JPM", Period::OneYear);

        assert_eq!(res.source, DataSource::SampleData);
        assert_eq!(res.trace.len(), 1);
        assert_eq!(polygon_calls.load(Ordering::SeqCst), 1);
        assert_eq!(yahoo_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn second_resolve_is_served_from_cache() {
        let (yahoo, calls) = StubProvider::boxed(ProviderId::Yahoo, true);
        let orchestrator = FallbackOrchestrator::new(ProviderRegistry::empty().with_provider(yahoo));
        orchestrator.resolve("NVDA", Period::OneYear);
        let res = orchestrator.resolve("NVDA", Period::OneYear);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(res.trace.attempts()[0].message.contains("cache"));
    }

    #[test]
    fn failures_are_not_cached() {
        let (yahoo, calls) = StubProvider::boxed(ProviderId::Yahoo, false);
        let orchestrator = FallbackOrchestrator::new(ProviderRegistry::empty().with_provider(yahoo));
        orchestrator.resolve("TSLA", Period::OneYear);
        orchestrator.resolve("TSLA", Period::OneYear);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(orchestrator.cache().is_empty());
    }

    #[test]
    fn connection_check_reports_every_provider() {
        let (yahoo, _) = StubProvider::boxed(ProviderId::Yahoo, true);
        let (av, _) = StubProvider::boxed(ProviderId::AlphaVantage, false);
        let registry = ProviderRegistry::empty().with_provider(yahoo).with_provider(av);
        let status = FallbackOrchestrator::new(registry).check_connections();

        assert_eq!(status.len(), 3);
        assert!(status[0].working);
        assert!(!status[1].working);
        assert!(status[1].message.contains("request failed"));
        assert!(!status[2].working);
    }
}
