//! Prediction result types.
//!
//! Represents the output of the heart-disease classifier as sent on the wire.

use serde::{Deserialize, Serialize};

use super::encoding::EncodeError;

/// Errors raised while turning a record into a prediction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("{stage} expects {expected} features, got {actual}")]
    DimensionMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Non-finite value in {stage}")]
    NonFinite { stage: &'static str },
}

/// Classifier output for one request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// 0 = no disease, 1 = disease
    pub prediction: u8,

    /// Probability of the positive class; `None` when the classifier
    /// exposes no probability estimate.
    #[serde(default)]
    pub probability: Option<f64>,
}

impl PredictionResult {
    #[must_use]
    pub fn new(prediction: u8, probability: Option<f64>) -> Self {
        Self {
            prediction,
            probability,
        }
    }

    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.prediction == 1
    }

    /// Label is 0 or 1 and any probability lies in `[0, 1]`.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.prediction <= 1 && self.probability.map_or(true, |p| (0.0..=1.0).contains(&p))
    }
}
