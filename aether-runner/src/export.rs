//! CSV export and import of enriched series.
//!
//! Columns: Date, Open, High, Low, Close, Volume, MA_20, MA_50, RSI,
//! Price_Change, Volume_MA, Close_Lag_1, Close_Lag_2, Close_Lag_3, Close_Lag_5.
//! Dates are ISO `YYYY-MM-DD`. Floats are written at full precision, so an
//! export reads back to identical rows.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use aether_core::domain::DataSource;
use aether_core::features::{EnrichedRow, EnrichedSeries};
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const CSV_HEADER: [&str; 15] = [
    "Date",
    "Open",
    "High",
    "Low",
    "Close",
    "Volume",
    "MA_20",
    "MA_50",
    "RSI",
    "Price_Change",
    "Volume_MA",
    "Close_Lag_1",
    "Close_Lag_2",
    "Close_Lag_3",
    "Close_Lag_5",
];

const FILE_MARKER: &str = "_stock_data_";

#[derive(Debug, Serialize, Deserialize)]
struct CsvRecord {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: u64,
    #[serde(rename = "MA_20")]
    ma_20: f64,
    #[serde(rename = "MA_50")]
    ma_50: f64,
    #[serde(rename = "RSI")]
    rsi: f64,
    #[serde(rename = "Price_Change")]
    price_change: f64,
    #[serde(rename = "Volume_MA")]
    volume_ma: f64,
    #[serde(rename = "Close_Lag_1")]
    close_lag_1: f64,
    #[serde(rename = "Close_Lag_2")]
    close_lag_2: f64,
    #[serde(rename = "Close_Lag_3")]
    close_lag_3: f64,
    #[serde(rename = "Close_Lag_5")]
    close_lag_5: f64,
}

impl From<&EnrichedRow> for CsvRecord {
    fn from(r: &EnrichedRow) -> Self {
        Self {
            date: r.date,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
            ma_20: r.ma_20,
            ma_50: r.ma_50,
            rsi: r.rsi,
            price_change: r.price_change,
            volume_ma: r.volume_ma,
            close_lag_1: r.close_lag_1,
            close_lag_2: r.close_lag_2,
            close_lag_3: r.close_lag_3,
            close_lag_5: r.close_lag_5,
        }
    }
}

impl From<CsvRecord> for EnrichedRow {
    fn from(r: CsvRecord) -> Self {
        Self {
            date: r.date,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
            ma_20: r.ma_20,
            ma_50: r.ma_50,
            rsi: r.rsi,
            price_change: r.price_change,
            volume_ma: r.volume_ma,
            close_lag_1: r.close_lag_1,
            close_lag_2: r.close_lag_2,
            close_lag_3: r.close_lag_3,
            close_lag_5: r.close_lag_5,
        }
    }
}

/// `{TICKER}_stock_data_{YYYYMMDD}.csv`
pub fn export_file_name(ticker: &str, date: NaiveDate) -> String {
    format!(
        "{}{}{}.csv",
        ticker.trim().to_ascii_uppercase(),
        FILE_MARKER,
        date.format("%Y%m%d")
    )
}

/// Ticker encoded in an export file name, if the name follows the pattern.
pub fn ticker_from_file_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let (ticker, _) = stem.rsplit_once(FILE_MARKER)?;
    (!ticker.is_empty()).then(|| ticker.to_string())
}

pub fn write_csv<W: Write>(series: &EnrichedSeries, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if series.is_empty() {
        wtr.write_record(CSV_HEADER)?;
    }
    for row in series.rows() {
        wtr.serialize(CsvRecord::from(row))?;
    }
    wtr.flush().context("failed to flush CSV writer")?;
    Ok(())
}

pub fn export_csv(series: &EnrichedSeries) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(series, &mut buf)?;
    String::from_utf8(buf).context("CSV output is not valid UTF-8")
}

/// Write `series` into `dir` under its export file name and return the path.
pub fn export_to_dir(series: &EnrichedSeries, dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    let path = dir.join(export_file_name(series.ticker(), date));
    let file = File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(series, file)?;
    tracing::info!(path = %path.display(), rows = series.len(), "exported CSV");
    Ok(path)
}

/// Parse an export back into an enriched series tagged `CsvImport`.
pub fn read_csv<R: Read>(ticker: &str, reader: R) -> Result<EnrichedSeries> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers().context("failed to read CSV header")?.clone();
    if let Some(missing) = CSV_HEADER.iter().find(|h| !headers.iter().any(|x| x == **h)) {
        bail!("CSV is missing column '{missing}'");
    }

    let mut rows = Vec::new();
    for (i, record) in rdr.deserialize::<CsvRecord>().enumerate() {
        let record = record.with_context(|| format!("invalid CSV row {}", i + 1))?;
        rows.push(EnrichedRow::from(record));
    }
    Ok(EnrichedSeries::from_rows(ticker, DataSource::CsvImport, rows))
}

/// Read an exported file; the ticker is taken from the file name.
pub fn import_file(path: &Path) -> Result<EnrichedSeries> {
    let ticker = ticker_from_file_name(path).unwrap_or_else(|| "IMPORTED".to_string());
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_csv(&ticker, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aether_core::data::synthetic::generate_until;
    use aether_core::domain::Period;
    use aether_core::features::process;

    fn sample() -> EnrichedSeries {
        let anchor = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        process(&generate_until("V", Period::SixMonths, anchor), DataSource::SampleData).unwrap()
    }

    #[test]
    fn file_name_pattern() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 7).unwrap();
        assert_eq!(export_file_name("aapl", date), "AAPL_stock_data_20250207.csv");
        assert_eq!(
            ticker_from_file_name(Path::new("/tmp/TCS.NSE_stock_data_20250207.csv")),
            Some("TCS.NSE".to_string())
        );
        assert_eq!(ticker_from_file_name(Path::new("prices.csv")), None);
    }

    #[test]
    fn header_matches_column_list() {
        let csv = export_csv(&sample()).unwrap();
        let header = csv.lines().next().unwrap();
        assert_eq!(header, CSV_HEADER.join(","));
    }

    #[test]
    fn empty_series_still_has_header() {
        let anchor = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        let empty =
            process(&generate_until("V", Period::OneMonth, anchor), DataSource::SampleData)
                .unwrap();
        let csv = export_csv(&empty).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn string_round_trip_is_exact() {
        let series = sample();
        let csv = export_csv(&series).unwrap();
        let back = read_csv("V", csv.as_bytes()).unwrap();
        assert_eq!(back.rows(), series.rows());
        assert_eq!(back.source(), DataSource::CsvImport);
    }

    #[test]
    fn missing_column_is_rejected() {
        let err = read_csv("X", "Date,Open\n2024-01-02,1.0\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("missing column"));
    }
}
