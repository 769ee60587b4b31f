//! Fractional close change over N bars.
//!
//! PCT[t] = (close[t] - close[t-period]) / close[t-period]
//! Lookback: period. A zero reference close yields NaN.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct PctChange {
    period: usize,
    name: String,
}

impl PctChange {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "PctChange period must be >= 1");
        Self {
            period,
            name: format!("pct_change_{period}"),
        }
    }
}

impl Indicator for PctChange {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        for i in self.period..n {
            let prev = bars[i - self.period].close;
            if prev != 0.0 {
                result[i] = (bars[i].close - prev) / prev;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn one_bar_change() {
        let bars = make_bars(&[100.0, 110.0, 99.0]);
        let result = PctChange::new(1).compute(&bars);
        assert!(result[0].is_nan());
        assert_approx(result[1], 0.10, DEFAULT_EPSILON);
        assert_approx(result[2], -0.10, DEFAULT_EPSILON);
    }

    #[test]
    fn zero_reference_is_nan() {
        let mut bars = make_bars(&[1.0, 2.0]);
        bars[0].close = 0.0;
        assert!(PctChange::new(1).compute(&bars)[1].is_nan());
    }
}
