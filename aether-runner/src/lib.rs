//! Aether Runner: close-price prediction and analysis sessions.
//!
//! This crate builds on `aether-core` to provide:
//! - Feature matrix extraction and chronological train/test split
//! - Standard scaler and a bagged regression-tree ensemble
//! - Fit metrics, feature importances and the next-close outlook
//! - Price summary statistics
//! - CSV export/import of enriched series
//! - TOML application config with environment overrides
//! - `AnalysisSession`: resolve → enrich → train → predict

pub mod config;
pub mod dataset;
pub mod export;
pub mod forest;
pub mod metrics;
pub mod predictor;
pub mod scaler;
pub mod session;
pub mod summary;

pub use config::{validate_ticker, AppConfig, ConfigError, DataSettings, ProviderKeys};
pub use dataset::{split_sizes, ChronoSplit, FeatureMatrix};
pub use export::{export_csv, export_file_name, export_to_dir, import_file, read_csv, write_csv};
pub use forest::{ForestConfig, ForestError, RandomForest};
pub use metrics::{FeatureImportance, ModelMetrics, QualityGrade};
pub use predictor::{predict_next, train, ModelConfig, Outlook, Signal, TrainError, TrainedModel};
pub use scaler::StandardScaler;
pub use session::{AnalysisReport, AnalysisSession, SessionError};
pub use summary::PriceSummary;

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn model_types_are_send_sync() {
        assert_send::<TrainedModel>();
        assert_sync::<TrainedModel>();
        assert_send::<RandomForest>();
        assert_sync::<RandomForest>();
        assert_send::<StandardScaler>();
        assert_sync::<StandardScaler>();
    }

    #[test]
    fn report_types_are_send_sync() {
        assert_send::<AnalysisReport>();
        assert_sync::<AnalysisReport>();
        assert_send::<ModelMetrics>();
        assert_sync::<ModelMetrics>();
        assert_send::<PriceSummary>();
        assert_sync::<PriceSummary>();
    }

    #[test]
    fn session_is_send_sync() {
        assert_send::<AnalysisSession>();
        assert_sync::<AnalysisSession>();
        assert_send::<AppConfig>();
        assert_sync::<AppConfig>();
    }
}
