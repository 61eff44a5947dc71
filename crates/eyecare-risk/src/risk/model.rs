use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::inference::features::{as_float, FeatureRow};

/// The opaque stage-one classifier.
///
/// `feature_names` is authoritative: rows handed to `predict_proba` are
/// aligned to exactly this ordered column set.
pub trait RiskClassifier: Send + Sync {
    fn feature_names(&self) -> &[String];

    /// `[p_low, p_high]` for one aligned row.
    fn predict_proba(&self, row: &FeatureRow) -> Result<[f64; 2], ModelError>;

    fn model_version(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("risk model not found at {path}")]
    NotFound { path: PathBuf },
    #[error("failed to read risk model at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("risk model artifact is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("risk model does not expose its feature names")]
    MissingFeatureNames,
    #[error("risk model field `{field}` has {actual} entries, expected {expected}")]
    ShapeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("feature row has {actual} cells, model expects {expected}")]
    RowShape { expected: usize, actual: usize },
    #[error("risk model loader failed: {0}")]
    Loader(String),
    #[error("risk model cache lock poisoned")]
    LockPoisoned,
}

/// Logistic-regression risk model exported as JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticRiskModel {
    #[serde(default)]
    model_version: Option<String>,
    #[serde(default)]
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
    /// Value used for a null or unreadable cell.
    #[serde(default)]
    imputation: Vec<f64>,
    #[serde(default)]
    scaler_mean: Option<Vec<f64>>,
    #[serde(default)]
    scaler_scale: Option<Vec<f64>>,
    /// Per-column encodings for string categories, e.g. Gender.
    #[serde(default)]
    categories: BTreeMap<String, BTreeMap<String, f64>>,
}

impl LogisticRiskModel {
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let raw = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ModelError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ModelError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ModelError> {
        let mut model: Self = serde_json::from_str(raw)?;
        model.validate()?;
        if model.imputation.is_empty() {
            model.imputation = vec![0.0; model.feature_names.len()];
        }
        Ok(model)
    }

    fn validate(&self) -> Result<(), ModelError> {
        let expected = self.feature_names.len();
        if expected == 0 {
            return Err(ModelError::MissingFeatureNames);
        }

        let mut vectors = vec![("coefficients", self.coefficients.len())];
        if !self.imputation.is_empty() {
            vectors.push(("imputation", self.imputation.len()));
        }
        if let Some(mean) = &self.scaler_mean {
            vectors.push(("scaler_mean", mean.len()));
        }
        if let Some(scale) = &self.scaler_scale {
            vectors.push(("scaler_scale", scale.len()));
        }

        match vectors.into_iter().find(|(_, actual)| *actual != expected) {
            Some((field, actual)) => Err(ModelError::ShapeMismatch {
                field,
                expected,
                actual,
            }),
            None => Ok(()),
        }
    }

    fn encode(&self, index: usize, column: &str, value: &Value) -> f64 {
        let fallback = self.imputation.get(index).copied().unwrap_or(0.0);
        if let Value::String(text) = value {
            if let Some(encoded) = self
                .categories
                .get(column)
                .and_then(|levels| levels.get(text.trim()))
            {
                return *encoded;
            }
        }
        as_float(value).unwrap_or(fallback)
    }

    fn standardize(&self, index: usize, x: f64) -> f64 {
        let mean = self
            .scaler_mean
            .as_ref()
            .and_then(|mean| mean.get(index))
            .copied()
            .unwrap_or(0.0);
        let scale = self
            .scaler_scale
            .as_ref()
            .and_then(|scale| scale.get(index))
            .copied()
            .filter(|scale| *scale != 0.0)
            .unwrap_or(1.0);
        (x - mean) / scale
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl RiskClassifier for LogisticRiskModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, row: &FeatureRow) -> Result<[f64; 2], ModelError> {
        let expected = self.feature_names.len();
        if row.len() != expected {
            return Err(ModelError::RowShape {
                expected,
                actual: row.len(),
            });
        }

        let z = row
            .iter()
            .enumerate()
            .map(|(index, (column, value))| {
                let x = self.standardize(index, self.encode(index, column, value));
                self.coefficients[index] * x
            })
            .sum::<f64>()
            + self.intercept;

        let p_high = sigmoid(z);
        Ok([1.0 - p_high, p_high])
    }

    fn model_version(&self) -> Option<&str> {
        self.model_version.as_deref()
    }
}
