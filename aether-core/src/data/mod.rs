//! Market data acquisition: ticker mapping, provider adapters, fetch cache,
//! synthetic fallback and the provider fallback chain.

#[cfg(feature = "alpha-vantage")]
pub mod alpha_vantage;
pub mod cache;
pub mod catalog;
pub mod fallback;
pub mod info;
#[cfg(feature = "polygon")]
pub mod polygon;
pub mod provider;
pub mod rate_limiter;
pub mod registry;
pub mod synthetic;
pub mod ticker;
#[cfg(feature = "yahoo")]
pub mod yahoo;

#[cfg(feature = "alpha-vantage")]
pub use alpha_vantage::AlphaVantageProvider;
pub use cache::FetchCache;
pub use catalog::{CatalogEntry, CatalogError, Market, TickerCatalog};
pub use fallback::{
    AttemptOutcome, ConnectionStatus, FallbackOrchestrator, FetchAttempt, FetchTrace, Resolution,
};
pub use info::{stock_info, Currency, StockInfo};
#[cfg(feature = "polygon")]
pub use polygon::PolygonProvider;
pub use provider::{DataError, DataProvider};
pub use rate_limiter::RateLimiter;
pub use registry::{ProviderConfig, ProviderRegistry, ProviderSlot, SlotState, Unavailable};
pub use ticker::{base_symbol, is_regional, map_ticker};
#[cfg(feature = "yahoo")]
pub use yahoo::YahooProvider;
