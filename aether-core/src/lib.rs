//! Aether Core: market data acquisition and feature engineering.
//!
//! This crate contains everything up to the model input:
//! - Domain types (bars, OHLCV series, periods, data sources)
//! - Provider-specific ticker mapping
//! - Provider adapters behind the `DataProvider` trait
//! - Fallback chain with fetch trace, TTL cache and synthetic fallback
//! - Trailing-window indicators and the feature pipeline

pub mod data;
pub mod domain;
pub mod features;
pub mod indicators;
