//! Inference service: Orchestrates encoding, scaling, and classification.
//!
//! This service coordinates, per request:
//! - Feature encoding into the canonical column order
//! - The fitted scaling transform
//! - Label prediction and, when supported, the positive-class probability

use std::sync::Arc;
use std::time::Instant;

use crate::domain::{encode, ColumnOrder, InferenceError, PatientRecord, PredictionResult, ScaledVector};
use crate::ports::{Classifier, Scaler};
use crate::HeartRiskError;

/// Immutable service context built once at start-up.
///
/// Holds the three loaded artifacts behind `Arc` so every request reads the
/// same instances without locking.
pub struct InferenceService<S, C>
where
    S: Scaler,
    C: Classifier,
{
    scaler: Arc<S>,
    classifier: Arc<C>,
    columns: ColumnOrder,
}

impl<S, C> InferenceService<S, C>
where
    S: Scaler,
    C: Classifier,
{
    /// Create a new inference service.
    ///
    /// # Errors
    /// Returns `HeartRiskError::Validation` if the scaler, classifier, and
    /// column list disagree on the number of features.
    pub fn new(scaler: Arc<S>, classifier: Arc<C>, columns: ColumnOrder) -> Result<Self, HeartRiskError> {
        let n = columns.len();
        if scaler.n_features() != n || classifier.n_features() != n {
            return Err(HeartRiskError::Validation(format!(
                "Feature width mismatch: columns={n}, scaler={}, classifier={}",
                scaler.n_features(),
                classifier.n_features()
            )));
        }
        Ok(Self {
            scaler,
            classifier,
            columns,
        })
    }

    /// Run the prediction pipeline for one record.
    ///
    /// Errors are not recovered here; they become the request's response.
    ///
    /// # Errors
    /// Returns `InferenceError::Encode` on a schema mismatch, or any error
    /// raised by the scaler or classifier.
    pub fn predict(&self, record: &PatientRecord) -> Result<PredictionResult, InferenceError> {
        let started = Instant::now();

        let features = encode(record, &self.columns)?;
        let scaled = self.scaler.transform(&features)?;
        let result = self.classify(&scaled)?;

        tracing::debug!(
            "Prediction complete: label={}, probability={}, elapsed_us={}",
            result.prediction,
            if result.probability.is_some() { "available" } else { "unsupported" },
            started.elapsed().as_micros()
        );

        Ok(result)
    }

    /// Label and, when the classifier supports it, positive-class probability
    /// for an already scaled vector.
    ///
    /// # Errors
    /// Returns any error raised by the classifier.
    pub fn classify(&self, scaled: &ScaledVector) -> Result<PredictionResult, InferenceError> {
        let prediction = self.classifier.predict(scaled)?;
        let probability = self.classifier.predict_proba(scaled)?.map(|[_, p1]| p1);
        Ok(PredictionResult::new(prediction, probability))
    }
}
