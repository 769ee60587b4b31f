//! One analysis request: resolve, enrich, train, predict.
//!
//! Ticker validation happens before any provider is contacted. Data failures
//! never abort the request (the fallback chain always yields a series);
//! training failure is carried in the report for the caller to surface.

use aether_core::data::{
    stock_info, FallbackOrchestrator, FetchCache, ProviderRegistry, Resolution, StockInfo,
};
use aether_core::domain::{DataSource, Period};
use aether_core::features::{process, EnrichedSeries};
use thiserror::Error;

use crate::config::{validate_ticker, AppConfig, ConfigError};
use crate::predictor::{train, ModelConfig, Outlook, TrainError, TrainedModel};
use crate::summary::PriceSummary;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no rows returned for '{ticker}'")]
    NoData { ticker: String },
}

/// Everything the presentation layer shows for one ticker.
#[derive(Debug)]
pub struct AnalysisReport {
    pub ticker: String,
    pub period: Period,
    pub info: StockInfo,
    pub resolution: Resolution,
    pub enriched: EnrichedSeries,
    pub summary: Option<PriceSummary>,
    pub model: Result<TrainedModel, TrainError>,
}

impl AnalysisReport {
    pub fn source(&self) -> DataSource {
        self.resolution.source
    }

    pub fn trained(&self) -> Option<&TrainedModel> {
        self.model.as_ref().ok()
    }

    pub fn prediction(&self) -> Option<f64> {
        self.trained()?.predict_next(&self.enriched)
    }

    pub fn outlook(&self) -> Option<Outlook> {
        self.trained()?.outlook(&self.enriched)
    }
}

pub struct AnalysisSession {
    orchestrator: FallbackOrchestrator,
    model: ModelConfig,
}

impl AnalysisSession {
    pub fn new(orchestrator: FallbackOrchestrator, model: ModelConfig) -> Self {
        Self {
            orchestrator,
            model,
        }
    }

    /// Probe providers from `config` and wire cache and source preference.
    pub fn from_config(config: &AppConfig) -> Self {
        let registry = ProviderRegistry::probe(&config.provider_config());
        Self::with_registry(config, registry)
    }

    /// Session with no providers: every request is served sample data.
    pub fn offline(config: &AppConfig) -> Self {
        Self::with_registry(config, ProviderRegistry::empty())
    }

    fn with_registry(config: &AppConfig, registry: ProviderRegistry) -> Self {
        let orchestrator = FallbackOrchestrator::new(registry)
            .with_cache(FetchCache::with_ttl(config.cache_ttl()))
            .with_preference(config.data.source);
        Self::new(orchestrator, config.model.clone())
    }

    pub fn orchestrator(&self) -> &FallbackOrchestrator {
        &self.orchestrator
    }

    pub fn model_config(&self) -> &ModelConfig {
        &self.model
    }

    /// Resolve and enrich only.
    pub fn fetch(
        &self,
        ticker: &str,
        period: Period,
    ) -> Result<(Resolution, EnrichedSeries), SessionError> {
        let ticker = validate_ticker(ticker)?;
        let resolution = self.orchestrator.resolve(&ticker, period);
        let enriched = process(&resolution.series, resolution.source)
            .ok_or_else(|| SessionError::NoData {
                ticker: ticker.clone(),
            })?;
        Ok((resolution, enriched))
    }

    pub fn analyze(&self, ticker: &str, period: Period) -> Result<AnalysisReport, SessionError> {
        let (resolution, enriched) = self.fetch(ticker, period)?;
        let ticker = enriched.ticker().to_string();
        let summary = PriceSummary::compute(&resolution.series, Some(&enriched));
        let model = train(&enriched, &self.model);
        if let Err(e) = &model {
            tracing::warn!(ticker = %ticker, error = %e, "training skipped");
        }

        Ok(AnalysisReport {
            info: stock_info(&ticker),
            ticker,
            period,
            resolution,
            enriched,
            summary,
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline() -> AnalysisSession {
        let mut config = AppConfig::default();
        config.model.n_trees = 8;
        AnalysisSession::offline(&config)
    }

    #[test]
    fn blank_ticker_fails_before_fetching() {
        let session = offline();
        let err = session.analyze("   ", Period::OneYear).unwrap_err();
        assert!(matches!(err, SessionError::Config(ConfigError::MissingTicker)));
        assert!(session.orchestrator().cache().is_empty());
    }

    #[test]
    fn offline_analysis_uses_sample_data() {
        let report = offline().analyze("nvda", Period::OneYear).unwrap();
        assert_eq!(report.ticker, "NVDA");
        assert_eq!(report.source(), DataSource::SampleData);
        assert_eq!(report.info.name, "NVIDIA Corporation");
        assert!(report.summary.is_some());
        assert!(report.prediction().is_some());
        assert!(report.outlook().is_some());
    }

    #[test]
    fn short_period_reports_training_failure() {
        let report = offline().analyze("AAPL", Period::OneMonth).unwrap();
        assert!(report.enriched.is_empty());
        assert!(matches!(
            report.model,
            Err(TrainError::InsufficientData { rows: 0 })
        ));
        assert!(report.prediction().is_none());
        assert!(report.summary.is_some());
    }
}
