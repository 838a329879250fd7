//! Delegate classifier: an externally trained model the scorer defers to.
//!
//! The model file is JSON with a named feature schema. Weights are keyed by
//! feature name, never by position, so the training/serving feature order
//! can never silently disagree. Schema validation happens at load time and
//! a bad file is a startup error; a missing file is not.

use crate::scorer::RiskQuery;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Feature names a model schema may reference.
pub const KNOWN_FEATURES: [&str; 3] = ["hour", "rain", "weekend"];

/// Fixed probability emitted for a binary "high" label.
pub const LABEL_HIGH_PROBABILITY: u8 = 85;
/// Fixed probability emitted for a binary "low" label.
pub const LABEL_LOW_PROBABILITY: u8 = 15;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cannot read model file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse model file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("model schema declares no features")]
    EmptySchema,

    #[error("unknown feature '{0}' in model schema (known: hour, rain, weekend)")]
    UnknownFeature(String),

    #[error("model schema declares feature '{0}' but provides no weight for it")]
    MissingWeight(String),

    #[error("query has no value for feature '{0}' required by the model")]
    MissingFeature(String),
}

/// How the model's raw output is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelOutput {
    /// Sigmoid output scaled to an integer probability 0-100.
    #[default]
    Probability,
    /// Binary label at the 0.5 cutoff, mapped to the fixed 85/15 pair.
    Label,
}

// ============================================================================
// Delegate Model
// ============================================================================

/// A logistic model over named features. Read-only after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelegateModel {
    /// Named feature schema. Order is irrelevant: weights are keyed by name.
    pub features: Vec<String>,
    pub weights: BTreeMap<String, f64>,
    pub bias: f64,
    #[serde(default)]
    pub output: ModelOutput,
}

impl DelegateModel {
    /// Load and validate a model file. A missing file yields `Ok(None)`
    /// (heuristic fallback); anything else wrong with the file is an error.
    pub fn load(path: &Path) -> Result<Option<Self>, ModelError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(ModelError::Read {
                    path: path.display().to_string(),
                    source: err,
                })
            }
        };

        let model: Self = serde_json::from_str(&raw).map_err(|err| ModelError::Parse {
            path: path.display().to_string(),
            source: err,
        })?;
        model.validate()?;
        Ok(Some(model))
    }

    /// Reject schemas that could misclassify silently: every feature must be
    /// a known name and must have a weight.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.features.is_empty() {
            return Err(ModelError::EmptySchema);
        }
        for name in &self.features {
            if !KNOWN_FEATURES.contains(&name.as_str()) {
                return Err(ModelError::UnknownFeature(name.clone()));
            }
            if !self.weights.contains_key(name) {
                return Err(ModelError::MissingWeight(name.clone()));
            }
        }
        Ok(())
    }

    /// Evaluate the model against a query, returning an integer probability
    /// 0-100. Fails only when the query lacks a feature the schema requires
    /// (e.g. a weekend-aware model queried without a weekend flag).
    pub fn predict(&self, query: &RiskQuery) -> Result<u8, ModelError> {
        let mut z = self.bias;
        for name in &self.features {
            let value = feature_value(query, name)
                .ok_or_else(|| ModelError::MissingFeature(name.clone()))?;
            let weight = self
                .weights
                .get(name)
                .copied()
                .ok_or_else(|| ModelError::MissingWeight(name.clone()))?;
            z += weight * value;
        }

        let p = sigmoid(z);
        Ok(match self.output {
            ModelOutput::Probability => (p * 100.0).round().clamp(0.0, 100.0) as u8,
            ModelOutput::Label => {
                if p >= 0.5 {
                    LABEL_HIGH_PROBABILITY
                } else {
                    LABEL_LOW_PROBABILITY
                }
            }
        })
    }

    /// Train the builtin logistic model from five hand-written rows by
    /// deterministic gradient descent. Used when no model file exists but a
    /// live-looking learned score is still wanted.
    pub fn train_builtin() -> Self {
        // (hour, rain) -> delayed
        const ROWS: [(f64, f64, f64); 5] = [
            (8.0, 1.0, 1.0),
            (18.0, 1.0, 1.0),
            (17.0, 0.0, 1.0),
            (3.0, 0.0, 0.0),
            (12.0, 0.0, 0.0),
        ];
        const LEARNING_RATE: f64 = 0.01;
        const EPOCHS: usize = 8000;

        let (mut w_hour, mut w_rain, mut bias) = (0.0_f64, 0.0_f64, 0.0_f64);
        for _ in 0..EPOCHS {
            for (hour, rain, label) in ROWS {
                let p = sigmoid(bias + w_hour * hour + w_rain * rain);
                let err = p - label;
                w_hour -= LEARNING_RATE * err * hour;
                w_rain -= LEARNING_RATE * err * rain;
                bias -= LEARNING_RATE * err;
            }
        }

        let mut weights = BTreeMap::new();
        weights.insert("hour".to_string(), w_hour);
        weights.insert("rain".to_string(), w_rain);

        Self {
            features: vec!["hour".to_string(), "rain".to_string()],
            weights,
            bias,
            output: ModelOutput::Probability,
        }
    }
}

fn feature_value(query: &RiskQuery, name: &str) -> Option<f64> {
    match name {
        "hour" => Some(query.hour as f64),
        "rain" => Some(query.rain as f64),
        "weekend" => query.weekend.map(|w| w as f64),
        _ => None,
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
