//! Bar and OhlcvSeries: the fundamental market data units.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single trading day.
///
/// Prices are already adjusted by the provider adapter that produced the bar;
/// nothing downstream distinguishes raw from adjusted closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Returns true if any price field is NaN or the close is not positive.
    /// A zero close would turn the next day's return into infinity.
    pub fn is_void(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.close <= 0.0
    }
}

/// Daily OHLCV series for one ticker.
///
/// Bars are ascending by date with no duplicate dates. The constructor
/// enforces this; the series is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvSeries {
    ticker: String,
    bars: Vec<Bar>,
}

impl OhlcvSeries {
    /// Build a series, sorting by date and keeping the last bar seen for any
    /// duplicated date. Void bars are dropped.
    pub fn new(ticker: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        bars.retain(|b| !b.is_void());
        // Stable sort keeps provider order within a date, so the later bar wins below.
        bars.sort_by_key(|b| b.date);
        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self {
            ticker: ticker.into(),
            bars: deduped,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Closing prices in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// BLAKE3 digest over dates and OHLCV values, used to tell datasets apart.
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.ticker.as_bytes());
        for bar in &self.bars {
            hasher.update(bar.date.to_string().as_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
            hasher.update(&bar.volume.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn bar_detects_void() {
        assert!(!bar(2, 100.0).is_void());
        let mut b = bar(2, 100.0);
        b.open = f64::NAN;
        assert!(b.is_void());
    }

    #[test]
    fn non_positive_close_is_void() {
        assert!(bar(2, 0.0).is_void());
        assert!(bar(2, -1.5).is_void());
    }

    #[test]
    fn series_sorts_and_dedups() {
        let series = OhlcvSeries::new(
            "AAPL",
            vec![bar(4, 103.0), bar(2, 101.0), bar(3, 102.0), bar(3, 102.5)],
        );
        let closes = series.closes();
        assert_eq!(closes, vec![101.0, 102.5, 103.0]);
        for w in series.bars().windows(2) {
            assert!(w[0].date < w[1].date);
        }
    }

    #[test]
    fn series_drops_void_bars() {
        let mut void = bar(3, 1.0);
        void.close = f64::NAN;
        let series = OhlcvSeries::new("AAPL", vec![bar(2, 100.0), void]);
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn series_drops_zero_close_bars() {
        let series = OhlcvSeries::new("AAPL", vec![bar(2, 100.0), bar(3, 0.0), bar(4, 101.0)]);
        assert_eq!(series.closes(), vec![100.0, 101.0]);
    }

    #[test]
    fn content_hash_is_stable() {
        let a = OhlcvSeries::new("AAPL", vec![bar(2, 1.0), bar(3, 2.0)]);
        let b = OhlcvSeries::new("AAPL", vec![bar(3, 2.0), bar(2, 1.0)]);
        assert_eq!(a.content_hash(), b.content_hash());
    }
}
