//! Provider identities and data provenance.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The three upstream market-data providers, in fallback priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    /// Primary: free source, no credentials.
    Yahoo,
    /// Secondary: keyed API, strict per-minute quota.
    AlphaVantage,
    /// Tertiary: keyed API, limited regional coverage on the free tier.
    Polygon,
}

impl ProviderId {
    /// Fallback order used by the orchestrator.
    pub const PRIORITY: [ProviderId; 3] =
        [ProviderId::Yahoo, ProviderId::AlphaVantage, ProviderId::Polygon];

    /// Stable identifier used in traces, cache keys and `source_id`.
    pub fn key(self) -> &'static str {
        match self {
            ProviderId::Yahoo => "yahoo_finance",
            ProviderId::AlphaVantage => "alpha_vantage",
            ProviderId::Polygon => "polygon",
        }
    }

    /// Human-readable provider name.
    pub fn display_name(self) -> &'static str {
        match self {
            ProviderId::Yahoo => "Yahoo Finance",
            ProviderId::AlphaVantage => "Alpha Vantage",
            ProviderId::Polygon => "Polygon.io",
        }
    }

    /// Whether the provider needs an API key.
    pub fn requires_api_key(self) -> bool {
        !matches!(self, ProviderId::Yahoo)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Provider(ProviderId),
    /// Imported from a previously exported CSV file.
    CsvImport,
    /// Deterministic placeholder data used when every provider failed.
    SampleData,
}

impl DataSource {
    /// The `source_id` string reported to callers.
    pub fn id(self) -> &'static str {
        match self {
            DataSource::Provider(p) => p.key(),
            DataSource::CsvImport => "csv_import",
            DataSource::SampleData => "sample_data",
        }
    }

    pub fn is_synthetic(self) -> bool {
        matches!(self, DataSource::SampleData)
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Which providers the fallback chain may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SourcePreference {
    /// Walk the whole chain in priority order.
    #[default]
    Auto,
    /// Try exactly one provider, then fall back to sample data.
    Only(ProviderId),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown data source '{0}' (expected auto, yahoo, alpha_vantage or polygon)")]
pub struct ParseSourceError(pub String);

impl FromStr for SourcePreference {
    type Err = ParseSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "auto" => Ok(SourcePreference::Auto),
            "yahoo" | "yahoo_finance" | "yfinance" => Ok(SourcePreference::Only(ProviderId::Yahoo)),
            "alpha_vantage" | "alphavantage" => {
                Ok(SourcePreference::Only(ProviderId::AlphaVantage))
            }
            "polygon" => Ok(SourcePreference::Only(ProviderId::Polygon)),
            _ => Err(ParseSourceError(s.to_string())),
        }
    }
}

impl TryFrom<String> for SourcePreference {
    type Error = ParseSourceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SourcePreference> for String {
    fn from(value: SourcePreference) -> Self {
        value.to_string()
    }
}

impl fmt::Display for SourcePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourcePreference::Auto => f.write_str("auto"),
            SourcePreference::Only(p) => f.write_str(p.key()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_order_is_primary_first() {
        assert_eq!(ProviderId::PRIORITY[0], ProviderId::Yahoo);
        assert_eq!(ProviderId::PRIORITY[2], ProviderId::Polygon);
    }

    #[test]
    fn source_ids() {
        assert_eq!(DataSource::SampleData.id(), "sample_data");
        assert_eq!(DataSource::Provider(ProviderId::AlphaVantage).id(), "alpha_vantage");
        assert!(DataSource::SampleData.is_synthetic());
    }

    #[test]
    fn parses_source_preference() {
        assert_eq!("auto".parse(), Ok(SourcePreference::Auto));
        assert_eq!(
            "alpha-vantage".parse(),
            Ok(SourcePreference::Only(ProviderId::AlphaVantage))
        );
        assert!("bloomberg".parse::<SourcePreference>().is_err());
    }
}
