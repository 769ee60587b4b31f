//! Trailing-window technical indicators.
//!
//! Indicators are pure functions: bar history in, numeric series out, same
//! length as the input. Positions without enough history hold `f64::NAN`.
//!
//! # Look-ahead guard
//! No value at bar t may depend on bar t+1 or later. Every indicator must
//! produce the same prefix on a truncated series as on the full one.

pub mod lag;
pub mod pct_change;
pub mod rsi;
pub mod sma;

pub use lag::Lag;
pub use pct_change::PctChange;
pub use rsi::Rsi;
pub use sma::{PriceField, Sma};

use crate::domain::Bar;

pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading bars that come out as NaN.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the whole series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev_close (or close for the first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    /// Every indicator gives the same values on a prefix as on the full series.
    #[test]
    fn no_lookahead() {
        let closes: Vec<f64> = (0..80)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1)
            .collect();
        let bars = make_bars(&closes);
        let indicators: Vec<Box<dyn Indicator>> = vec![
            Box::new(Sma::new(20, PriceField::Close)),
            Box::new(Sma::new(10, PriceField::Volume)),
            Box::new(Rsi::new(14)),
            Box::new(PctChange::new(1)),
            Box::new(Lag::new(5)),
        ];
        for ind in &indicators {
            let full = ind.compute(&bars);
            let truncated = ind.compute(&bars[..60]);
            for i in 0..60 {
                let (a, b) = (full[i], truncated[i]);
                assert!(
                    (a.is_nan() && b.is_nan()) || (a - b).abs() < 1e-9,
                    "{} differs at {i}: {a} vs {b}",
                    ind.name()
                );
            }
            assert_eq!(full.iter().take_while(|v| v.is_nan()).count(), ind.lookback());
        }
    }
}
