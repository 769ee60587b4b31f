//! Feature pipeline: OHLCV series in, indicator-enriched rows out.
//!
//! Derived columns are all trailing-window functions, so incomplete rows are
//! always the leading ones. With the default windows the widest is the
//! 50-bar moving average, so a series of `n >= 50` bars keeps exactly the
//! last `n - 49` rows.

use crate::domain::{Bar, DataSource, OhlcvSeries};
use crate::indicators::{Indicator, Lag, PctChange, PriceField, Rsi, Sma};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SHORT_MA: usize = 20;
pub const LONG_MA: usize = 50;
pub const RSI_PERIOD: usize = 14;
pub const VOLUME_MA: usize = 10;
pub const CLOSE_LAGS: [usize; 4] = [1, 2, 3, 5];

/// Leading rows dropped for lack of history.
pub const WARMUP_ROWS: usize = LONG_MA - 1;

/// Model input columns, in the order they are fed to the predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureColumn {
    Open,
    High,
    Low,
    Volume,
    Ma20,
    Ma50,
    Rsi,
    PriceChange,
    VolumeMa,
    CloseLag1,
    CloseLag2,
    CloseLag3,
    CloseLag5,
}

impl FeatureColumn {
    pub const ALL: [FeatureColumn; 13] = [
        FeatureColumn::Open,
        FeatureColumn::High,
        FeatureColumn::Low,
        FeatureColumn::Volume,
        FeatureColumn::Ma20,
        FeatureColumn::Ma50,
        FeatureColumn::Rsi,
        FeatureColumn::PriceChange,
        FeatureColumn::VolumeMa,
        FeatureColumn::CloseLag1,
        FeatureColumn::CloseLag2,
        FeatureColumn::CloseLag3,
        FeatureColumn::CloseLag5,
    ];

    /// Columns computed by the pipeline (everything but raw OHLCV).
    pub const DERIVED: [FeatureColumn; 9] = [
        FeatureColumn::Ma20,
        FeatureColumn::Ma50,
        FeatureColumn::Rsi,
        FeatureColumn::PriceChange,
        FeatureColumn::VolumeMa,
        FeatureColumn::CloseLag1,
        FeatureColumn::CloseLag2,
        FeatureColumn::CloseLag3,
        FeatureColumn::CloseLag5,
    ];

    /// Column header used in tables and CSV files.
    pub fn name(self) -> &'static str {
        match self {
            FeatureColumn::Open => "Open",
            FeatureColumn::High => "High",
            FeatureColumn::Low => "Low",
            FeatureColumn::Volume => "Volume",
            FeatureColumn::Ma20 => "MA_20",
            FeatureColumn::Ma50 => "MA_50",
            FeatureColumn::Rsi => "RSI",
            FeatureColumn::PriceChange => "Price_Change",
            FeatureColumn::VolumeMa => "Volume_MA",
            FeatureColumn::CloseLag1 => "Close_Lag_1",
            FeatureColumn::CloseLag2 => "Close_Lag_2",
            FeatureColumn::CloseLag3 => "Close_Lag_3",
            FeatureColumn::CloseLag5 => "Close_Lag_5",
        }
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One fully populated row of the enriched series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub ma_20: f64,
    pub ma_50: f64,
    pub rsi: f64,
    pub price_change: f64,
    pub volume_ma: f64,
    pub close_lag_1: f64,
    pub close_lag_2: f64,
    pub close_lag_3: f64,
    pub close_lag_5: f64,
}

impl EnrichedRow {
    pub fn feature(&self, column: FeatureColumn) -> f64 {
        match column {
            FeatureColumn::Open => self.open,
            FeatureColumn::High => self.high,
            FeatureColumn::Low => self.low,
            FeatureColumn::Volume => self.volume as f64,
            FeatureColumn::Ma20 => self.ma_20,
            FeatureColumn::Ma50 => self.ma_50,
            FeatureColumn::Rsi => self.rsi,
            FeatureColumn::PriceChange => self.price_change,
            FeatureColumn::VolumeMa => self.volume_ma,
            FeatureColumn::CloseLag1 => self.close_lag_1,
            FeatureColumn::CloseLag2 => self.close_lag_2,
            FeatureColumn::CloseLag3 => self.close_lag_3,
            FeatureColumn::CloseLag5 => self.close_lag_5,
        }
    }

    /// Feature vector in `FeatureColumn::ALL` order.
    pub fn features(&self) -> Vec<f64> {
        FeatureColumn::ALL.iter().map(|&c| self.feature(c)).collect()
    }

    /// True if every derived column holds a finite value.
    pub fn is_complete(&self) -> bool {
        FeatureColumn::DERIVED
            .iter()
            .all(|&c| self.feature(c).is_finite())
    }
}

/// Display metadata. Carries no computational meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesMeta {
    pub ticker: String,
    pub source: DataSource,
    pub processed_at: DateTime<Utc>,
}

/// OHLCV rows plus derived indicator columns, all populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedSeries {
    meta: SeriesMeta,
    rows: Vec<EnrichedRow>,
}

impl EnrichedSeries {
    /// Wrap already-complete rows (e.g. read back from CSV). Incomplete rows
    /// are dropped and the rest sorted by date.
    pub fn from_rows(
        ticker: impl Into<String>,
        source: DataSource,
        mut rows: Vec<EnrichedRow>,
    ) -> Self {
        rows.retain(EnrichedRow::is_complete);
        rows.sort_by_key(|r| r.date);
        rows.dedup_by_key(|r| r.date);
        Self {
            meta: SeriesMeta {
                ticker: ticker.into(),
                source,
                processed_at: Utc::now(),
            },
            rows,
        }
    }

    pub fn meta(&self) -> &SeriesMeta {
        &self.meta
    }

    pub fn ticker(&self) -> &str {
        &self.meta.ticker
    }

    pub fn source(&self) -> DataSource {
        self.meta.source
    }

    pub fn rows(&self) -> &[EnrichedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&EnrichedRow> {
        self.rows.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.close).collect()
    }
}

/// Compute every derived column for `bars`, NaN where history is short.
fn derive_columns(bars: &[Bar]) -> Vec<EnrichedRow> {
    let ma_20 = Sma::new(SHORT_MA, PriceField::Close).compute(bars);
    let ma_50 = Sma::new(LONG_MA, PriceField::Close).compute(bars);
    let rsi = Rsi::new(RSI_PERIOD).compute(bars);
    let price_change = PctChange::new(1).compute(bars);
    let volume_ma = Sma::new(VOLUME_MA, PriceField::Volume).compute(bars);
    let lags: Vec<Vec<f64>> = CLOSE_LAGS
        .iter()
        .map(|&k| Lag::new(k).compute(bars))
        .collect();

    bars.iter()
        .enumerate()
        .map(|(i, bar)| EnrichedRow {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            ma_20: ma_20[i],
            ma_50: ma_50[i],
            rsi: rsi[i],
            price_change: price_change[i],
            volume_ma: volume_ma[i],
            close_lag_1: lags[0][i],
            close_lag_2: lags[1][i],
            close_lag_3: lags[2][i],
            close_lag_5: lags[3][i],
        })
        .collect()
}

/// Enrich `series` with indicator columns and drop incomplete rows.
///
/// Returns `None` only for an empty input. A non-empty series that is too
/// short for the widest window yields `Some` with zero rows.
pub fn process(series: &OhlcvSeries, source: DataSource) -> Option<EnrichedSeries> {
    if series.is_empty() {
        return None;
    }
    let mut rows = derive_columns(series.bars());
    let total = rows.len();
    rows.retain(EnrichedRow::is_complete);
    tracing::debug!(
        ticker = series.ticker(),
        input = total,
        kept = rows.len(),
        "feature pipeline complete"
    );
    Some(EnrichedSeries {
        meta: SeriesMeta {
            ticker: series.ticker().to_string(),
            source,
            processed_at: Utc::now(),
        },
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn series(n: usize) -> OhlcvSeries {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + (i as f64 * 0.3).sin() * 4.0).collect();
        OhlcvSeries::new("TEST", make_bars(&closes))
    }

    #[test]
    fn empty_input_is_none() {
        let empty = OhlcvSeries::new("TEST", Vec::new());
        assert!(process(&empty, DataSource::SampleData).is_none());
    }

    #[test]
    fn short_input_keeps_no_rows() {
        let out = process(&series(30), DataSource::SampleData).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn keeps_trailing_rows_after_warmup() {
        let input = series(120);
        let out = process(&input, DataSource::SampleData).unwrap();
        assert_eq!(out.len(), 120 - WARMUP_ROWS);
        assert_eq!(out.rows()[0].date, input.bars()[WARMUP_ROWS].date);
        assert_eq!(out.last().unwrap().date, input.last_date().unwrap());
        assert!(out.rows().iter().all(EnrichedRow::is_complete));
    }

    #[test]
    fn zero_close_bar_does_not_punch_a_hole() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.3).sin() * 4.0).collect();
        let mut bars = make_bars(&closes);
        bars[80].close = 0.0;
        let input = OhlcvSeries::new("TEST", bars);
        assert_eq!(input.len(), 119);

        let out = process(&input, DataSource::SampleData).unwrap();
        assert_eq!(out.len(), 119 - WARMUP_ROWS);
        assert!(out.rows().iter().all(|r| r.price_change.is_finite()));
        let kept: Vec<_> = out.rows().iter().map(|r| r.date).collect();
        let expected: Vec<_> = input.bars()[WARMUP_ROWS..].iter().map(|b| b.date).collect();
        assert_eq!(kept, expected);
    }

    #[test]
    fn exactly_fifty_bars_keeps_one_row() {
        let out = process(&series(50), DataSource::SampleData).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn derived_values_line_up() {
        let input = series(60);
        let out = process(&input, DataSource::SampleData).unwrap();
        let row = &out.rows()[0];
        let bars = input.bars();
        let expected_ma20: f64 = bars[30..50].iter().map(|b| b.close).sum::<f64>() / 20.0;
        assert!((row.ma_20 - expected_ma20).abs() < 1e-9);
        assert_eq!(row.close_lag_1, bars[48].close);
        assert_eq!(row.close_lag_5, bars[44].close);
        assert!((row.price_change - (bars[49].close / bars[48].close - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn metadata_is_attached() {
        let out = process(&series(60), DataSource::CsvImport).unwrap();
        assert_eq!(out.ticker(), "TEST");
        assert_eq!(out.source(), DataSource::CsvImport);
    }

    #[test]
    fn feature_names_are_stable() {
        let names: Vec<&str> = FeatureColumn::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names[4], "MA_20");
        assert_eq!(names[12], "Close_Lag_5");
    }
}
