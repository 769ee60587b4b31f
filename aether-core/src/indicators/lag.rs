//! Close shifted back by N bars.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Lag {
    periods: usize,
    name: String,
}

impl Lag {
    pub fn new(periods: usize) -> Self {
        assert!(periods >= 1, "Lag must be >= 1");
        Self {
            periods,
            name: format!("close_lag_{periods}"),
        }
    }
}

impl Indicator for Lag {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.periods
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut result = vec![f64::NAN; bars.len()];
        for i in self.periods..bars.len() {
            result[i] = bars[i - self.periods].close;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn shifts_close() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0]);
        let result = Lag::new(2).compute(&bars);
        assert!(result[0].is_nan() && result[1].is_nan());
        assert_eq!(&result[2..], &[1.0, 2.0]);
    }
}
