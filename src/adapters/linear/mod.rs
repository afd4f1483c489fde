//! Linear model adapter: Scaler and Classifier implementations.
//!
//! Both types deserialize from the JSON exported by the training pipeline
//! and are read-only after load, so a single instance serves every request.
//!
//! # Model kinds
//!
//! - `logistic_regression`: label and probability (sigmoid of the decision value)
//! - `linear_svc`: label only; `predict_proba` reports "unsupported"

use serde::{Deserialize, Serialize};

use crate::domain::{FeatureVector, InferenceError, ScaledVector};
use crate::ports::{Classifier, Scaler};

/// Mean/variance normalization with parameters fixed at training time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Per-column training mean
    pub mean: Vec<f64>,
    /// Per-column training standard deviation
    pub scale: Vec<f64>,
    /// Column names seen at fit time, if exported
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

impl StandardScaler {
    #[must_use]
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self {
            mean,
            scale,
            feature_names: None,
        }
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, features: &FeatureVector) -> Result<ScaledVector, InferenceError> {
        let n = self.mean.len();
        if features.len() != n {
            return Err(InferenceError::DimensionMismatch {
                stage: "scaler",
                expected: n,
                actual: features.len(),
            });
        }

        let values = features
            .values()
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| {
                // Constant training columns were fitted with scale 0; they pass through centered.
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (x - mean) / scale
            })
            .collect::<Vec<f64>>();

        if values.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::NonFinite { stage: "scaler" });
        }

        Ok(ScaledVector::new(values))
    }

    fn n_features(&self) -> usize {
        self.mean.len()
    }
}

/// Supported linear classifier families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LogisticRegression,
    LinearSvc,
}

/// Binary linear classifier: `decision = intercept + coefficients · x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub kind: ModelKind,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    #[must_use]
    pub fn new(kind: ModelKind, coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            kind,
            coefficients,
            intercept,
        }
    }

    fn decision_function(&self, scaled: &ScaledVector) -> Result<f64, InferenceError> {
        let n = self.coefficients.len();
        if scaled.len() != n {
            return Err(InferenceError::DimensionMismatch {
                stage: "classifier",
                expected: n,
                actual: scaled.len(),
            });
        }

        let decision = self.intercept
            + self
                .coefficients
                .iter()
                .zip(scaled.values())
                .map(|(w, x)| w * x)
                .sum::<f64>();

        if !decision.is_finite() {
            return Err(InferenceError::NonFinite {
                stage: "classifier",
            });
        }
        Ok(decision)
    }
}

/// Logistic function, evaluated without overflow for large |x|.
fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

impl Classifier for LinearModel {
    fn predict(&self, scaled: &ScaledVector) -> Result<u8, InferenceError> {
        let decision = self.decision_function(scaled)?;
        Ok(u8::from(decision > 0.0))
    }

    fn predict_proba(&self, scaled: &ScaledVector) -> Result<Option<[f64; 2]>, InferenceError> {
        match self.kind {
            ModelKind::LogisticRegression => {
                let p1 = sigmoid(self.decision_function(scaled)?);
                Ok(Some([1.0 - p1, p1]))
            }
            ModelKind::LinearSvc => Ok(None),
        }
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ColumnOrder;

    fn vector(values: Vec<f64>) -> FeatureVector {
        let names = (0..values.len()).map(|i| format!("f{i}")).collect();
        let order = ColumnOrder::new(names).expect("valid");
        FeatureVector::new(order.shared(), values)
    }

    #[test]
    fn test_standard_scaler_transform() {
        let scaler = StandardScaler::new(vec![50.0, 1.0], vec![10.0, 0.5]);
        let scaled = scaler.transform(&vector(vec![60.0, 0.0])).expect("transform");
        assert!((scaled.values()[0] - 1.0).abs() < 1e-12);
        assert!((scaled.values()[1] + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_standard_scaler_zero_scale_is_identity_scale() {
        let scaler = StandardScaler::new(vec![0.0], vec![0.0]);
        let scaled = scaler.transform(&vector(vec![3.0])).expect("transform");
        assert!((scaled.values()[0] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_standard_scaler_rejects_wrong_width() {
        let scaler = StandardScaler::new(vec![0.0, 0.0], vec![1.0, 1.0]);
        let err = scaler.transform(&vector(vec![1.0])).expect_err("must fail");
        assert_eq!(
            err,
            InferenceError::DimensionMismatch {
                stage: "scaler",
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_logistic_regression_label_and_probability() {
        let model = LinearModel::new(ModelKind::LogisticRegression, vec![2.0, -1.0], 0.5);

        let positive = ScaledVector::new(vec![1.0, 0.0]); // decision 2.5
        assert_eq!(model.predict(&positive).expect("predict"), 1);
        let [p0, p1] = model
            .predict_proba(&positive)
            .expect("proba")
            .expect("supported");
        assert!((p1 - sigmoid(2.5)).abs() < 1e-12);
        assert!((p0 + p1 - 1.0).abs() < 1e-12);

        let negative = ScaledVector::new(vec![-1.0, 1.0]); // decision -2.5
        assert_eq!(model.predict(&negative).expect("predict"), 0);
    }

    #[test]
    fn test_zero_decision_predicts_negative() {
        let model = LinearModel::new(ModelKind::LogisticRegression, vec![1.0], 0.0);
        let at_boundary = ScaledVector::new(vec![0.0]);
        assert_eq!(model.predict(&at_boundary).expect("predict"), 0);
        let proba = model.predict_proba(&at_boundary).expect("proba");
        assert_eq!(proba, Some([0.5, 0.5]));
    }

    #[test]
    fn test_linear_svc_has_no_probability() {
        let model = LinearModel::new(ModelKind::LinearSvc, vec![1.0], -0.2);
        let x = ScaledVector::new(vec![1.0]);
        assert_eq!(model.predict(&x).expect("predict"), 1);
        assert_eq!(model.predict_proba(&x).expect("proba"), None);
    }

    #[test]
    fn test_sigmoid_is_stable_for_extremes() {
        assert!((sigmoid(1000.0) - 1.0).abs() < 1e-12);
        assert!(sigmoid(-1000.0) >= 0.0);
        assert!(sigmoid(-1000.0) < 1e-12);
    }

    #[test]
    fn test_model_json_shape() {
        let json = r#"{"kind":"linear_svc","coefficients":[0.1,0.2],"intercept":-1.0}"#;
        let model: LinearModel = serde_json::from_str(json).expect("parse");
        assert_eq!(model.kind, ModelKind::LinearSvc);
        assert_eq!(model.n_features(), 2);
    }
}
