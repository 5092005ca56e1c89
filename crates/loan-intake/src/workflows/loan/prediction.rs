use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use super::features::FeatureRecord;

/// Contract for the external classifier. Implementations return the raw integer label.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &FeatureRecord) -> Result<i64, PredictorError>;
}

impl<P: Predictor + ?Sized> Predictor for Arc<P> {
    fn predict(&self, features: &FeatureRecord) -> Result<i64, PredictorError> {
        (**self).predict(features)
    }
}

/// Failure inside a predictor implementation.
#[derive(Debug, thiserror::Error)]
pub enum PredictorError {
    #[error("predictor requires feature '{0}' which was not supplied")]
    MissingFeature(String),
    #[error("predictor unavailable: {0}")]
    Unavailable(String),
}

/// Interpreted predictor label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanPrediction {
    Rejected,
    Accepted,
}

impl LoanPrediction {
    pub fn from_label(label: i64) -> Result<Self, PredictionError> {
        match label {
            0 => Ok(LoanPrediction::Rejected),
            1 => Ok(LoanPrediction::Accepted),
            other => Err(PredictionError::UnrecognizedLabel(other)),
        }
    }

    pub const fn label(self) -> i64 {
        match self {
            LoanPrediction::Rejected => 0,
            LoanPrediction::Accepted => 1,
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            LoanPrediction::Rejected => "The loan is likely to be rejected.",
            LoanPrediction::Accepted => "The loan is likely to be accepted.",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("Error: the predictor returned an unrecognized label ({0})")]
    UnrecognizedLabel(i64),
    #[error(transparent)]
    Predictor(#[from] PredictorError),
}

/// Run the predictor and interpret its label. Labels other than 0 and 1 are errors.
pub fn predict<P: Predictor + ?Sized>(
    predictor: &P,
    features: &FeatureRecord,
) -> Result<LoanPrediction, PredictionError> {
    let label = predictor.predict(features).map_err(|err| {
        warn!(error = %err, "predictor failed");
        err
    })?;

    LoanPrediction::from_label(label).map_err(|err| {
        warn!(label, "predictor returned an unrecognized label");
        err
    })
}
