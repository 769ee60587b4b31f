//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over the upstream market-data APIs so the
//! fallback chain can be driven by mocks in tests. Adapters report every
//! failure as a `DataError` value; nothing in the fetch path panics.

use crate::domain::{OhlcvSeries, Period, ProviderId};
use thiserror::Error;

/// Structured error types for data operations.
///
/// These are displayable in CLI output and in fetch traces.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API key not configured")]
    MissingApiKey,

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("empty result for {symbol}")]
    EmptyResult { symbol: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("HTTP {status} from provider")]
    HttpStatus { status: u16 },

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for upstream market-data providers.
///
/// Implementations map the ticker for their own symbol conventions, issue
/// one historical daily-bar request bounded by `period`, and normalize the
/// response into an `OhlcvSeries`. The cache layer sits above this trait.
pub trait DataProvider: Send + Sync {
    /// Which provider this adapter talks to.
    fn id(&self) -> ProviderId;

    /// Fetch daily OHLCV bars for `ticker` covering `period`.
    fn fetch(&self, ticker: &str, period: Period) -> Result<OhlcvSeries, DataError>;
}

/// Map a reqwest transport error into the structured taxonomy.
pub(crate) fn transport_error(err: reqwest::Error) -> DataError {
    if let Some(status) = err.status() {
        return DataError::HttpStatus {
            status: status.as_u16(),
        };
    }
    if err.is_decode() {
        return DataError::ResponseFormatChanged(err.to_string());
    }
    DataError::NetworkUnreachable(err.to_string())
}

/// Build the blocking HTTP client shared by the adapters.
///
/// Every call carries an explicit timeout so a hung provider cannot stall
/// the chain.
pub(crate) fn http_client(
    timeout: std::time::Duration,
) -> Result<reqwest::blocking::Client, DataError> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
        .build()
        .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))
}
