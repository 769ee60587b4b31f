//! Application configuration: TOML file, `.env`, environment overrides.
//!
//! ```toml
//! [data]
//! period = "1y"
//! source = "auto"            # or yahoo | alpha_vantage | polygon
//! cache_ttl_secs = 300
//! request_timeout_secs = 30
//! min_request_interval_ms = 1000
//!
//! [providers]
//! alpha_vantage_api_key = "..."
//! polygon_api_key = "..."
//!
//! [model]
//! n_trees = 100
//! max_depth = 10
//! test_fraction = 0.2
//! seed = 42
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use aether_core::data::ProviderConfig;
use aether_core::domain::{ParsePeriodError, ParseSourceError, Period, SourcePreference};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::predictor::ModelConfig;

pub const DEFAULT_CONFIG_FILE: &str = "aether.toml";
pub const ALPHA_VANTAGE_KEY_VAR: &str = "ALPHA_VANTAGE_API_KEY";
pub const POLYGON_KEY_VAR: &str = "POLYGON_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("please enter a ticker symbol")]
    MissingTicker,
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Period(#[from] ParsePeriodError),
    #[error(transparent)]
    Source(#[from] ParseSourceError),
    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub period: Period,
    pub source: SourcePreference,
    pub cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub min_request_interval_ms: u64,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            period: Period::OneYear,
            source: SourcePreference::Auto,
            cache_ttl_secs: 300,
            request_timeout_secs: 30,
            min_request_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderKeys {
    pub alpha_vantage_api_key: Option<String>,
    pub polygon_api_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataSettings,
    pub providers: ProviderKeys,
    pub model: ModelConfig,
}

impl AppConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load `path`, or `aether.toml` in the working directory when present,
    /// or defaults. `.env` is read first; environment keys win over the file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(env_file) = dotenvy::dotenv() {
            tracing::debug!(path = %env_file.display(), "loaded .env");
        }
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok());
        Ok(config)
    }

    /// Override API keys from `lookup` (normally the process environment).
    /// Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        if let Some(key) = get(ALPHA_VANTAGE_KEY_VAR) {
            self.providers.alpha_vantage_api_key = Some(key);
        }
        if let Some(key) = get(POLYGON_KEY_VAR) {
            self.providers.polygon_api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "data.request_timeout_secs must be positive".into(),
            ));
        }
        self.model
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            alpha_vantage_api_key: self.providers.alpha_vantage_api_key.clone(),
            polygon_api_key: self.providers.polygon_api_key.clone(),
            request_timeout: Duration::from_secs(self.data.request_timeout_secs),
            min_request_interval: Duration::from_millis(self.data.min_request_interval_ms),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.data.cache_ttl_secs)
    }
}

/// Trimmed, upper-cased ticker, or `MissingTicker` for blank input.
pub fn validate_ticker(raw: &str) -> Result<String, ConfigError> {
    let ticker = raw.trim();
    if ticker.is_empty() {
        return Err(ConfigError::MissingTicker);
    }
    Ok(ticker.to_ascii_uppercase())
}
