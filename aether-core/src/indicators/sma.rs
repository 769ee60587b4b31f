//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices or volume over a lookback window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::Indicator;
use crate::domain::Bar;

/// Which bar field an SMA averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    Close,
    Volume,
}

impl PriceField {
    fn value(self, bar: &Bar) -> f64 {
        match self {
            PriceField::Close => bar.close,
            PriceField::Volume => bar.volume as f64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    field: PriceField,
    name: String,
}

impl Sma {
    pub fn new(period: usize, field: PriceField) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        let name = match field {
            PriceField::Close => format!("sma_{period}"),
            PriceField::Volume => format!("volume_sma_{period}"),
        };
        Self {
            period,
            field,
            name,
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        let values: Vec<f64> = bars.iter().map(|b| self.field.value(b)).collect();

        // Rolling sums drift; each window is summed directly. Windows are small.
        for i in (self.period - 1)..n {
            let window = &values[(i + 1 - self.period)..=i];
            result[i] = window.iter().sum::<f64>() / self.period as f64;
        }

        result
    }
}
