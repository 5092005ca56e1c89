use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::features::FeatureRecord;
use super::fields::keys;
use super::prediction::{Predictor, PredictorError};

/// Linear scorecard: `intercept + sum(weight * feature)`, squashed through a logistic and
/// compared against `threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorecardConfig {
    pub intercept: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    pub weights: BTreeMap<String, f64>,
}

fn default_threshold() -> f64 {
    0.5
}

impl Default for ScorecardConfig {
    fn default() -> Self {
        let weights = [
            (keys::AGE, 0.0),
            (keys::EXPERIENCE, 0.0),
            (keys::INCOME, 0.06),
            (keys::FAMILY, 0.7),
            (keys::CC_AVG, 0.2),
            (keys::EDUCATION, 1.7),
            (keys::MORTGAGE, 0.001),
            (keys::SECURITIES_ACCOUNT, -0.9),
            (keys::CD_ACCOUNT, 3.5),
            (keys::ONLINE, -0.6),
            (keys::CREDIT_CARD, -1.0),
        ]
        .into_iter()
        .map(|(name, weight)| (name.to_string(), weight))
        .collect();

        Self {
            intercept: -13.0,
            threshold: default_threshold(),
            weights,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScorecardError {
    #[error("failed to read scorecard: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid scorecard JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("scorecard threshold {0} must lie within 0.0..=1.0")]
    InvalidThreshold(f64),
}

impl ScorecardConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ScorecardError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ScorecardError> {
        let config: ScorecardConfig = serde_json::from_reader(reader)?;
        if !(0.0..=1.0).contains(&config.threshold) {
            return Err(ScorecardError::InvalidThreshold(config.threshold));
        }
        Ok(config)
    }
}

/// Contribution of one feature, kept for transparency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreContribution {
    pub feature: String,
    pub value: f64,
    pub weight: f64,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorecardEvaluation {
    pub contributions: Vec<ScoreContribution>,
    pub logit: f64,
    pub probability: f64,
    pub label: i64,
}

/// Bundled stand-in for the external classifier.
#[derive(Debug, Clone, Default)]
pub struct ScorecardPredictor {
    config: ScorecardConfig,
}

impl ScorecardPredictor {
    pub fn new(config: ScorecardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScorecardConfig {
        &self.config
    }

    pub fn evaluate(&self, features: &FeatureRecord) -> Result<ScorecardEvaluation, PredictorError> {
        let mut contributions = Vec::with_capacity(self.config.weights.len());
        let mut logit = self.config.intercept;

        for (feature, weight) in &self.config.weights {
            let value = features
                .get(feature)
                .ok_or_else(|| PredictorError::MissingFeature(feature.clone()))?
                .as_f64();
            let contribution = weight * value;
            logit += contribution;
            contributions.push(ScoreContribution {
                feature: feature.clone(),
                value,
                weight: *weight,
                contribution,
            });
        }

        let probability = 1.0 / (1.0 + (-logit).exp());
        let label = if probability >= self.config.threshold {
            1
        } else {
            0
        };

        Ok(ScorecardEvaluation {
            contributions,
            logit,
            probability,
            label,
        })
    }
}

impl Predictor for ScorecardPredictor {
    fn predict(&self, features: &FeatureRecord) -> Result<i64, PredictorError> {
        self.evaluate(features).map(|evaluation| evaluation.label)
    }
}
