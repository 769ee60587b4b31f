//! Regression metrics: pure functions over actual/predicted slices.
//!
//! Slices must have equal length. Empty input yields 0.0.

use aether_core::features::FeatureColumn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fit quality on both splits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub train_rmse: f64,
    pub test_rmse: f64,
    pub train_mae: f64,
    pub test_mae: f64,
    pub train_r2: f64,
    pub test_r2: f64,
    pub train_size: usize,
    pub test_size: usize,
}

impl ModelMetrics {
    pub fn compute(
        train_actual: &[f64],
        train_pred: &[f64],
        test_actual: &[f64],
        test_pred: &[f64],
    ) -> Self {
        Self {
            train_rmse: rmse(train_actual, train_pred),
            test_rmse: rmse(test_actual, test_pred),
            train_mae: mae(train_actual, train_pred),
            test_mae: mae(test_actual, test_pred),
            train_r2: r2(train_actual, train_pred),
            test_r2: r2(test_actual, test_pred),
            train_size: train_actual.len(),
            test_size: test_actual.len(),
        }
    }

    pub fn quality(&self) -> QualityGrade {
        QualityGrade::from_r2(self.test_r2)
    }
}

/// Coarse grade of the held-out R².
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityGrade {
    Excellent,
    Good,
    Moderate,
    Poor,
}

impl QualityGrade {
    pub fn from_r2(r2: f64) -> Self {
        if r2 > 0.8 {
            QualityGrade::Excellent
        } else if r2 > 0.6 {
            QualityGrade::Good
        } else if r2 > 0.4 {
            QualityGrade::Moderate
        } else {
            QualityGrade::Poor
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QualityGrade::Excellent => "Excellent",
            QualityGrade::Good => "Good",
            QualityGrade::Moderate => "Moderate",
            QualityGrade::Poor => "Poor",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: FeatureColumn,
    pub importance: f64,
}

/// Pair columns with importances, most important first.
pub fn rank_importances(columns: &[FeatureColumn], values: &[f64]) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = columns
        .iter()
        .zip(values)
        .map(|(&feature, &importance)| FeatureImportance {
            feature,
            importance,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked
}

// ─── Individual metric functions ────────────────────────────────────

pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mse = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64;
    mse.sqrt()
}

pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Coefficient of determination. A constant target scores 1.0 when predicted
/// exactly and 0.0 otherwise.
pub fn r2(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_prediction() {
        let y = [1.0, 2.0, 3.0];
        assert_eq!(rmse(&y, &y), 0.0);
        assert_eq!(mae(&y, &y), 0.0);
        assert_eq!(r2(&y, &y), 1.0);
    }

    #[test]
    fn known_values() {
        let y = [1.0, 2.0, 3.0, 4.0];
        let p = [2.0, 2.0, 3.0, 2.0];
        assert!((mae(&y, &p) - 0.75).abs() < 1e-12);
        assert!((rmse(&y, &p) - (5.0_f64 / 4.0).sqrt()).abs() < 1e-12);
        // ss_tot = 5, ss_res = 5
        assert!(r2(&y, &p).abs() < 1e-12);
    }

    #[test]
    fn mean_predictor_scores_zero_r2() {
        let y = [2.0, 4.0, 6.0];
        assert!(r2(&y, &[4.0, 4.0, 4.0]).abs() < 1e-12);
        assert!(r2(&y, &[6.0, 4.0, 2.0]) < 0.0);
    }

    #[test]
    fn constant_target() {
        assert_eq!(r2(&[5.0, 5.0], &[5.0, 5.0]), 1.0);
        assert_eq!(r2(&[5.0, 5.0], &[4.0, 5.0]), 0.0);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(rmse(&[], &[]), 0.0);
        assert_eq!(mae(&[], &[]), 0.0);
        assert_eq!(r2(&[], &[]), 0.0);
    }

    #[test]
    fn grades() {
        assert_eq!(QualityGrade::from_r2(0.95), QualityGrade::Excellent);
        assert_eq!(QualityGrade::from_r2(0.8), QualityGrade::Good);
        assert_eq!(QualityGrade::from_r2(0.5), QualityGrade::Moderate);
        assert_eq!(QualityGrade::from_r2(-3.0), QualityGrade::Poor);
    }

    #[test]
    fn importances_are_ranked_descending() {
        let ranked = rank_importances(
            &[FeatureColumn::Open, FeatureColumn::Rsi, FeatureColumn::Ma20],
            &[0.1, 0.3, 0.6],
        );
        assert_eq!(ranked[0].feature, FeatureColumn::Ma20);
        assert_eq!(ranked[2].feature, FeatureColumn::Open);
    }
}
