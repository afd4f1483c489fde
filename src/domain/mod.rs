//! Domain layer: Core types and the feature encoder.
//!
//! Pure Rust with no I/O. Everything here is deterministic and testable
//! without artifacts or a network.

pub mod encoding;
mod features;
mod patient;
mod prediction;

pub use encoding::{encode, encode_row, AgeBracket, EncodeError, EncodedRow};
pub use features::{ColumnOrder, ColumnOrderError, FeatureVector, ScaledVector};
pub use patient::{
    Categoricals, ChestPainType, ExerciseAngina, PatientRecord, RestingEcg, Sex, StSlope, Vitals,
};
pub use prediction::{InferenceError, PredictionResult};

#[cfg(test)]
pub(crate) use encoding::training_columns;
#[cfg(test)]
pub(crate) use patient::sample_record;
