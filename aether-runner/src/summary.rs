//! Headline statistics for a price history.

use aether_core::domain::OhlcvSeries;
use aether_core::features::EnrichedSeries;
use serde::{Deserialize, Serialize};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub current_price: f64,
    /// Change versus the previous close; zero for a single bar.
    pub change: f64,
    pub change_pct: f64,
    pub volume: u64,
    /// Annualized sample volatility of daily returns, as a percentage.
    /// Needs more than two returns.
    pub volatility_pct: Option<f64>,
    pub period_high: f64,
    pub period_low: f64,
    pub avg_volume: f64,
    pub latest_rsi: Option<f64>,
}

impl PriceSummary {
    /// `None` for an empty series. RSI comes from `enriched` when it has rows.
    pub fn compute(series: &OhlcvSeries, enriched: Option<&EnrichedSeries>) -> Option<Self> {
        let bars = series.bars();
        let last = bars.last()?;
        let prev_close = bars
            .len()
            .checked_sub(2)
            .map_or(last.close, |i| bars[i].close);
        let change = last.close - prev_close;
        let change_pct = if prev_close != 0.0 {
            change / prev_close * 100.0
        } else {
            0.0
        };

        let period_high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let period_low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let avg_volume = bars.iter().map(|b| b.volume as f64).sum::<f64>() / bars.len() as f64;

        Some(Self {
            current_price: last.close,
            change,
            change_pct,
            volume: last.volume,
            volatility_pct: annualized_volatility(&series.closes()).map(|v| v * 100.0),
            period_high,
            period_low,
            avg_volume,
            latest_rsi: enriched.and_then(|e| e.last()).map(|r| r.rsi),
        })
    }
}

/// Sample std of simple daily returns scaled by `sqrt(252)`, as a fraction.
pub fn annualized_volatility(closes: &[f64]) -> Option<f64> {
    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect();
    if returns.len() <= 2 {
        return None;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt() * TRADING_DAYS_PER_YEAR.sqrt())
}
