//! Close-price model: scaler + forest fit on a chronological split.

use aether_core::features::{EnrichedRow, EnrichedSeries, FeatureColumn};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::dataset::FeatureMatrix;
use crate::forest::{ForestConfig, ForestError, RandomForest};
use crate::metrics::{rank_importances, FeatureImportance, ModelMetrics};
use crate::scaler::StandardScaler;

/// Model hyperparameters, also the `[model]` config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub test_fraction: f64,
    pub seed: u64,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            test_fraction: 0.2,
            seed: 42,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl ModelConfig {
    pub fn forest_config(&self) -> ForestConfig {
        ForestConfig {
            n_trees: self.n_trees,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: None,
            bootstrap: true,
            seed: self.seed,
        }
    }

    pub fn validate(&self) -> Result<(), TrainError> {
        if self.n_trees == 0 {
            return Err(TrainError::InvalidConfig("n_trees must be at least 1".into()));
        }
        if self.max_depth == 0 {
            return Err(TrainError::InvalidConfig("max_depth must be at least 1".into()));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(TrainError::InvalidConfig(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("insufficient data for training: {rows} usable rows after feature engineering")]
    InsufficientData { rows: usize },
    #[error("insufficient data for training: split left {train} train and {test} test rows")]
    EmptySplit { train: usize, test: usize },
    #[error("invalid model config: {0}")]
    InvalidConfig(String),
    #[error("forest error: {0}")]
    Forest(#[from] ForestError),
}

/// A fitted model with the scaler it was trained behind.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    forest: RandomForest,
    scaler: StandardScaler,
    metrics: ModelMetrics,
    importances: Vec<FeatureImportance>,
}

/// Fit scaler and forest on the oldest rows, evaluate on the most recent.
pub fn train(series: &EnrichedSeries, config: &ModelConfig) -> Result<TrainedModel, TrainError> {
    config.validate()?;
    let matrix = FeatureMatrix::from_series(series);
    if matrix.is_empty() {
        return Err(TrainError::InsufficientData { rows: 0 });
    }

    let split = matrix.split_chronological(config.test_fraction);
    let (train, test) = (&split.train, &split.test);
    if train.is_empty() || test.is_empty() {
        return Err(TrainError::EmptySplit {
            train: train.len(),
            test: test.len(),
        });
    }

    let scaler = StandardScaler::fit(train.rows()).ok_or(TrainError::InsufficientData {
        rows: train.len(),
    })?;
    let train_x = scaler.transform(train.rows());
    let test_x = scaler.transform(test.rows());

    let forest = RandomForest::fit(&config.forest_config(), &train_x, train.labels())?;
    let metrics = ModelMetrics::compute(
        train.labels(),
        &forest.predict(&train_x),
        test.labels(),
        &forest.predict(&test_x),
    );
    let importances = rank_importances(matrix.columns(), forest.feature_importances());

    tracing::info!(
        ticker = series.ticker(),
        train = metrics.train_size,
        test = metrics.test_size,
        test_rmse = metrics.test_rmse,
        test_r2 = metrics.test_r2,
        "model trained"
    );

    Ok(TrainedModel {
        forest,
        scaler,
        metrics,
        importances,
    })
}

/// Predict with an optional model, so callers holding a failed training
/// result get `None` rather than an error.
pub fn predict_next(model: Option<&TrainedModel>, series: &EnrichedSeries) -> Option<f64> {
    model?.predict_next(series)
}

impl TrainedModel {
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn metrics(&self) -> &ModelMetrics {
        &self.metrics
    }

    /// All features, most important first.
    pub fn importances(&self) -> &[FeatureImportance] {
        &self.importances
    }

    pub fn top_importances(&self, k: usize) -> &[FeatureImportance] {
        &self.importances[..k.min(self.importances.len())]
    }

    pub fn predict_row(&self, row: &EnrichedRow) -> f64 {
        let x = self.scaler.transform_row(&row.features());
        self.forest.predict_one(&x)
    }

    /// Prediction for the close after the most recent row.
    pub fn predict_next(&self, series: &EnrichedSeries) -> Option<f64> {
        let last = series.last()?;
        let value = self.predict_row(last);
        value.is_finite().then_some(value)
    }

    pub fn outlook(&self, series: &EnrichedSeries) -> Option<Outlook> {
        let last_close = series.last()?.close;
        let predicted = self.predict_next(series)?;
        Some(Outlook::new(last_close, predicted))
    }

    pub fn feature_columns(&self) -> &'static [FeatureColumn] {
        &FeatureColumn::ALL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    StrongBullish,
    MildBullish,
    Neutral,
    Bearish,
}

impl Signal {
    /// Classify an expected change given in percent.
    pub fn from_change_pct(pct: f64) -> Self {
        if pct > 2.0 {
            Signal::StrongBullish
        } else if pct > 0.0 {
            Signal::MildBullish
        } else if pct > -2.0 {
            Signal::Neutral
        } else {
            Signal::Bearish
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::StrongBullish => "Strong Bullish",
            Signal::MildBullish => "Mild Bullish",
            Signal::Neutral => "Neutral",
            Signal::Bearish => "Bearish",
        };
        f.write_str(s)
    }
}

/// Predicted close against the latest close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outlook {
    pub last_close: f64,
    pub predicted: f64,
    pub change: f64,
    pub change_pct: f64,
    pub signal: Signal,
}

impl Outlook {
    pub fn new(last_close: f64, predicted: f64) -> Self {
        let change = predicted - last_close;
        let change_pct = if last_close != 0.0 {
            change / last_close * 100.0
        } else {
            0.0
        };
        Self {
            last_close,
            predicted,
            change,
            change_pct,
            signal: Signal::from_change_pct(change_pct),
        }
    }
}
