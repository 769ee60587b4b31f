//! Alpha Vantage data provider (secondary, API key required).
//!
//! Uses `TIME_SERIES_DAILY` with `outputsize=full` and trims the result to the
//! requested period locally. The free tier allows only a few calls per
//! minute, so every request goes through the adapter's `RateLimiter`.

use super::provider::{http_client, transport_error, DataError, DataProvider};
use super::rate_limiter::RateLimiter;
use super::ticker::map_ticker;
use crate::domain::{Bar, OhlcvSeries, Period, ProviderId};
use chrono::{Duration as ChronoDuration, NaiveDate};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const BASE_URL: &str = "https://www.alphavantage.co/query";

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyQuote>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyQuote {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

/// Alpha Vantage data provider.
pub struct AlphaVantageProvider {
    client: reqwest::blocking::Client,
    api_key: String,
    limiter: RateLimiter,
}

impl AlphaVantageProvider {
    pub fn new(
        api_key: impl Into<String>,
        timeout: Duration,
        min_interval: Duration,
    ) -> Result<Self, DataError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DataError::MissingApiKey);
        }
        Ok(Self {
            client: http_client(timeout)?,
            api_key,
            limiter: RateLimiter::new(min_interval),
        })
    }

    /// Map API-level messages to errors. Alpha Vantage answers HTTP 200 for
    /// almost everything and reports problems in the body.
    fn check_api_error(resp: &TimeSeriesResponse, symbol: &str) -> Result<(), DataError> {
        if let Some(msg) = &resp.error_message {
            if msg.contains("Invalid API call") {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }
            return Err(DataError::Other(msg.clone()));
        }
        for msg in [&resp.note, &resp.information].into_iter().flatten() {
            if msg.contains("call frequency") || msg.contains("rate limit") {
                return Err(DataError::RateLimited(msg.clone()));
            }
            if msg.to_ascii_lowercase().contains("apikey") {
                return Err(DataError::AuthenticationFailed(msg.clone()));
            }
            tracing::warn!(provider = "alpha_vantage", message = %msg, "provider notice");
        }
        Ok(())
    }

    fn parse_field(value: &str, field: &str) -> Result<f64, DataError> {
        value
            .trim()
            .parse::<f64>()
            .map_err(|_| DataError::ResponseFormatChanged(format!("bad {field} value '{value}'")))
    }

    /// Parse a `TIME_SERIES_DAILY` body, keeping bars on or after `start`.
    fn parse_response(
        ticker: &str,
        symbol: &str,
        body: &str,
        start: NaiveDate,
    ) -> Result<OhlcvSeries, DataError> {
        let resp: TimeSeriesResponse = serde_json::from_str(body).map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;
        Self::check_api_error(&resp, symbol)?;

        let series = resp.time_series.ok_or_else(|| {
            DataError::ResponseFormatChanged("missing 'Time Series (Daily)' object".into())
        })?;

        let mut bars = Vec::with_capacity(series.len());
        for (date_str, quote) in series {
            let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|_| {
                DataError::ResponseFormatChanged(format!("bad date '{date_str}'"))
            })?;
            if date < start {
                continue;
            }
            bars.push(Bar {
                date,
                open: Self::parse_field(&quote.open, "open")?,
                high: Self::parse_field(&quote.high, "high")?,
                low: Self::parse_field(&quote.low, "low")?,
                close: Self::parse_field(&quote.close, "close")?,
                volume: Self::parse_field(&quote.volume, "volume")?.max(0.0).round() as u64,
            });
        }

        if bars.is_empty() {
            return Err(DataError::EmptyResult {
                symbol: symbol.to_string(),
            });
        }
        Ok(OhlcvSeries::new(ticker, bars))
    }
}

impl DataProvider for AlphaVantageProvider {
    fn id(&self) -> ProviderId {
        ProviderId::AlphaVantage
    }

    fn fetch(&self, ticker: &str, period: Period) -> Result<OhlcvSeries, DataError> {
        let symbol = map_ticker(ticker, ProviderId::AlphaVantage);
        let start = chrono::Local::now().date_naive() - ChronoDuration::days(period.calendar_days());

        self.limiter.acquire();
        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol.as_str()),
                ("outputsize", "full"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .map_err(transport_error)?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited(format!("HTTP 429 for {symbol}")));
        }
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = resp.text().map_err(transport_error)?;
        Self::parse_response(ticker, &symbol, &body, start)
    }
}
