//! Polygon.io data provider (tertiary, API key required).
//!
//! Daily aggregates from `/v2/aggs/ticker/{symbol}/range/1/day/{from}/{to}`.
//! The free tier covers US listings only; regional tickers are sent as-is and
//! usually come back empty.

use super::provider::{http_client, transport_error, DataError, DataProvider};
use super::rate_limiter::RateLimiter;
use super::ticker::map_ticker;
use crate::domain::{Bar, OhlcvSeries, Period, ProviderId};
use chrono::{Duration as ChronoDuration, NaiveDate};
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://api.polygon.io/v2/aggs/ticker";

#[derive(Debug, Deserialize)]
struct AggsResponse {
    status: Option<String>,
    #[serde(default)]
    results: Option<Vec<Agg>>,
    error: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Agg {
    /// Bar start, Unix milliseconds.
    t: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    #[serde(default)]
    v: f64,
}

/// Polygon.io data provider.
pub struct PolygonProvider {
    client: reqwest::blocking::Client,
    api_key: String,
    limiter: RateLimiter,
}

impl PolygonProvider {
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

    fn aggs_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{BASE_URL}/{symbol}/range/1/day/{}/{}",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        )
    }

    fn parse_response(ticker: &str, symbol: &str, body: &str) -> Result<OhlcvSeries, DataError> {
        let resp: AggsResponse = serde_json::from_str(body).map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        let detail = resp
            .error
            .clone()
            .or_else(|| resp.message.clone())
            .unwrap_or_default();
        match resp.status.as_deref() {
            Some("NOT_AUTHORIZED") => return Err(DataError::AuthenticationFailed(detail)),
            Some("ERROR") => return Err(DataError::Other(detail)),
            _ => {}
        }

        let aggs = resp.results.unwrap_or_default();
        let mut bars = Vec::with_capacity(aggs.len());
        for agg in aggs {
            let date = chrono::DateTime::from_timestamp_millis(agg.t)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {}", agg.t))
                })?;
            bars.push(Bar {
                date,
                open: agg.o,
                high: agg.h,
                low: agg.l,
                close: agg.c,
                volume: agg.v.max(0.0).round() as u64,
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

impl DataProvider for PolygonProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Polygon
    }

    fn fetch(&self, ticker: &str, period: Period) -> Result<OhlcvSeries, DataError> {
        let symbol = map_ticker(ticker, ProviderId::Polygon);
        let end = chrono::Local::now().date_naive();
        let start = end - ChronoDuration::days(period.calendar_days());
        let url = Self::aggs_url(&symbol, start, end);

        self.limiter.acquire();
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("adjusted", "true"),
                ("sort", "asc"),
                ("limit", "50000"),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .map_err(transport_error)?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited(format!("HTTP 429 for {symbol}")));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(DataError::AuthenticationFailed(format!(
                "Polygon.io refused the request (HTTP {status})"
            )));
        }
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = resp.text().map_err(transport_error)?;
        Self::parse_response(ticker, &symbol, &body)
    }
}
