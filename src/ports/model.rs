//! Model ports: Traits for the fitted scaler and the trained classifier.
//!
//! These abstract the loaded artifacts from the inference service, so the
//! service can be exercised with hand-built fakes.

use crate::domain::{FeatureVector, InferenceError, ScaledVector};

/// A fitted, read-only scaling transform.
///
/// Implementations must be safe to call concurrently: no fitting or other
/// mutation happens at inference time.
pub trait Scaler: Send + Sync {
    /// Apply the fitted transform to one feature vector.
    ///
    /// # Errors
    /// Returns `InferenceError::DimensionMismatch` if the vector width differs
    /// from the fitted width.
    fn transform(&self, features: &FeatureVector) -> Result<ScaledVector, InferenceError>;

    /// Number of features the transform was fitted on.
    fn n_features(&self) -> usize;
}

/// A trained binary classifier.
pub trait Classifier: Send + Sync {
    /// Predict the discrete label (0 or 1).
    ///
    /// # Errors
    /// Returns `InferenceError` on width mismatch or non-finite input.
    fn predict(&self, scaled: &ScaledVector) -> Result<u8, InferenceError>;

    /// Class probabilities `[p0, p1]`.
    ///
    /// Returns `Ok(None)` when the classifier has no probability estimate;
    /// this is distinct from any probability value.
    ///
    /// # Errors
    /// Returns `InferenceError` on width mismatch or non-finite input.
    fn predict_proba(&self, scaled: &ScaledVector) -> Result<Option<[f64; 2]>, InferenceError>;

    /// Number of input features.
    fn n_features(&self) -> usize;
}
