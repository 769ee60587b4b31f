//! Feature matrix extraction and the chronological train/test split.

use aether_core::features::{EnrichedRow, EnrichedSeries, FeatureColumn};
use chrono::NaiveDate;

/// Model inputs with the same-row close as label, in date order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureMatrix {
    dates: Vec<NaiveDate>,
    rows: Vec<Vec<f64>>,
    labels: Vec<f64>,
}

impl FeatureMatrix {
    /// Feature columns are `FeatureColumn::ALL`; the label is `Close`.
    pub fn from_series(series: &EnrichedSeries) -> Self {
        Self::from_rows(series.rows())
    }

    fn from_rows(rows: &[EnrichedRow]) -> Self {
        Self {
            dates: rows.iter().map(|r| r.date).collect(),
            rows: rows.iter().map(EnrichedRow::features).collect(),
            labels: rows.iter().map(|r| r.close).collect(),
        }
    }

    pub fn columns(&self) -> &'static [FeatureColumn] {
        &FeatureColumn::ALL
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Split without shuffling: the last `round(test_fraction * n)` rows form
    /// the test set.
    pub fn split_chronological(&self, test_fraction: f64) -> ChronoSplit {
        let (train_size, _) = split_sizes(self.len(), test_fraction);
        let slice = |range: std::ops::Range<usize>| FeatureMatrix {
            dates: self.dates[range.clone()].to_vec(),
            rows: self.rows[range.clone()].to_vec(),
            labels: self.labels[range].to_vec(),
        };
        ChronoSplit {
            train: slice(0..train_size),
            test: slice(train_size..self.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChronoSplit {
    pub train: FeatureMatrix,
    pub test: FeatureMatrix,
}

/// `(train_size, test_size)` for `n` rows.
pub fn split_sizes(n: usize, test_fraction: f64) -> (usize, usize) {
    let fraction = test_fraction.clamp(0.0, 1.0);
    let test = ((n as f64 * fraction).round() as usize).min(n);
    (n - test, test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aether_core::data::synthetic::generate_until;
    use aether_core::domain::{DataSource, Period};
    use aether_core::features::process;

    fn one_year() -> EnrichedSeries {
        let anchor = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let raw = generate_until("AAPL", Period::OneYear, anchor);
        process(&raw, DataSource::SampleData).unwrap()
    }

    #[test]
    fn split_sizes_follow_rounding() {
        assert_eq!(split_sizes(203, 0.2), (162, 41));
        assert_eq!(split_sizes(10, 0.2), (8, 2));
        assert_eq!(split_sizes(2, 0.2), (2, 0));
        assert_eq!(split_sizes(0, 0.2), (0, 0));
        assert_eq!(split_sizes(5, 1.5), (0, 5));
    }

    #[test]
    fn matrix_uses_model_column_order() {
        let series = one_year();
        let m = FeatureMatrix::from_series(&series);
        assert_eq!(m.len(), series.len());
        assert_eq!(m.rows()[0].len(), FeatureColumn::ALL.len());
        assert_eq!(m.rows()[0][0], series.rows()[0].open);
        assert_eq!(m.labels()[0], series.rows()[0].close);
    }

    #[test]
    fn test_split_is_strictly_later() {
        let m = FeatureMatrix::from_series(&one_year());
        let split = m.split_chronological(0.2);
        assert_eq!(split.train.len() + split.test.len(), m.len());
        let last_train = *split.train.dates().last().unwrap();
        assert!(split.test.dates().iter().all(|d| *d > last_train));
    }
}
