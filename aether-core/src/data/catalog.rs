//! Ticker catalog: curated market-organized ticker lists.
//!
//! The built-in catalog covers the US and Indian markets; a replacement can
//! be loaded from TOML:
//!
//! ```toml
//! [[markets]]
//! name = "US Markets"
//! tickers = [{ symbol = "AAPL", name = "Apple Inc." }]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse catalog TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub symbol: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub name: String,
    pub tickers: Vec<CatalogEntry>,
}

/// Markets in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerCatalog {
    pub markets: Vec<Market>,
}

impl TickerCatalog {
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        Ok(toml::from_str(content)?)
    }

    pub fn market(&self, name: &str) -> Option<&Market> {
        self.markets
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn all_symbols(&self) -> Vec<&str> {
        self.markets
            .iter()
            .flat_map(|m| m.tickers.iter().map(|t| t.symbol.as_str()))
            .collect()
    }

    /// Company name for `symbol`, case-insensitive.
    pub fn lookup(&self, symbol: &str) -> Option<&CatalogEntry> {
        let symbol = symbol.trim();
        self.markets
            .iter()
            .flat_map(|m| m.tickers.iter())
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn ticker_count(&self) -> usize {
        self.markets.iter().map(|m| m.tickers.len()).sum()
    }

    /// The built-in US and Indian lists. Indian listings use the `.NSE` marker.
    pub fn builtin() -> Self {
        fn market(name: &str, entries: &[(&str, &str)]) -> Market {
            Market {
                name: name.to_string(),
                tickers: entries
                    .iter()
                    .map(|(symbol, name)| CatalogEntry {
                        symbol: symbol.to_string(),
                        name: name.to_string(),
                    })
                    .collect(),
            }
        }

        let us = market(
            "US Markets",
            &[
                ("AAPL", "Apple Inc."),
                ("GOOGL", "Alphabet Inc."),
                ("MSFT", "Microsoft Corporation"),
                ("BLK", "BlackRock Inc."),
                ("GS", "Goldman Sachs Group Inc."),
                ("STT", "State Street Corporation"),
                ("TSLA", "Tesla Inc."),
                ("AMZN", "Amazon.com Inc."),
                ("NVDA", "NVIDIA Corporation"),
                ("META", "Meta Platforms Inc."),
                ("NFLX", "Netflix Inc."),
                ("JPM", "JPMorgan Chase & Co."),
                ("V", "Visa Inc."),
            ],
        );
        let india = market(
            "Indian Markets",
            &[
                ("RELIANCE.NSE", "Reliance Industries"),
                ("TCS.NSE", "Tata Consultancy Services"),
                ("PARAS.NSE", "Paras Defence and Space Technologies"),
                ("INFY.NSE", "Infosys Limited"),
                ("HDFCBANK.NSE", "HDFC Bank"),
                ("WIPRO.NSE", "Wipro Limited"),
                ("ITC.NSE", "ITC Limited"),
                ("SBIN.NSE", "State Bank of India"),
                ("TATAMOTORS.NSE", "Tata Motors"),
                ("TATASTEEL.NSE", "Tata Steel"),
                ("KOTAKBANK.NSE", "Kotak Mahindra Bank"),
                ("BHARTIARTL.NSE", "Bharti Airtel"),
                ("HINDUNILVR.NSE", "Hindustan Unilever"),
            ],
        );
        Self {
            markets: vec![us, india],
        }
    }
}

impl Default for TickerCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
