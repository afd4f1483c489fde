//! Feature encoding: raw patient attributes to the model's feature vector.
//!
//! The encoding reproduces the training-time preprocessing:
//! - numeric fields pass through unchanged
//! - each categorical field is one-hot encoded with its first category dropped
//! - age is bucketed into baseline / middle-aged / senior indicators
//! - the target column `HeartDisease` is present with value 0
//!
//! The categorical mapping is a table (`CATEGORICAL_SCHEMA`), not branching
//! code. Values outside a field's table encode as all-zero indicators, which
//! is what the training pipeline produced for them.

use super::features::{ColumnOrder, FeatureVector};
use super::patient::PatientRecord;

/// Column name of the training target, present in the training frame.
pub const TARGET_PLACEHOLDER: &str = "HeartDisease";

/// Error raised when the canonical column list and encoder disagree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("Canonical column {column:?} is not produced by the encoder")]
    SchemaMismatch { column: String },
}

/// Drop-first one-hot encoding of one categorical field.
pub struct OneHotField {
    /// Wire name of the field
    pub field: &'static str,
    /// Reference category, implied when every indicator is 0
    pub baseline: &'static str,
    /// `(category, column)` pairs for every non-baseline category
    pub indicators: &'static [(&'static str, &'static str)],
    value: fn(&PatientRecord) -> &str,
}

impl OneHotField {
    /// 1.0 when the record's value is exactly `category`, else 0.0.
    fn indicator(&self, record: &PatientRecord, category: &str) -> f64 {
        if (self.value)(record) == category {
            1.0
        } else {
            0.0
        }
    }
}

fn field_sex(r: &PatientRecord) -> &str {
    &r.sex
}

fn field_chest_pain_type(r: &PatientRecord) -> &str {
    &r.chest_pain_type
}

fn field_resting_ecg(r: &PatientRecord) -> &str {
    &r.resting_ecg
}

fn field_exercise_angina(r: &PatientRecord) -> &str {
    &r.exercise_angina
}

fn field_st_slope(r: &PatientRecord) -> &str {
    &r.st_slope
}

pub static CATEGORICAL_SCHEMA: [OneHotField; 5] = [
    OneHotField {
        field: "Sex",
        baseline: "Female",
        indicators: &[("Male", "Sex_M")],
        value: field_sex,
    },
    OneHotField {
        field: "ChestPainType",
        baseline: "ASY",
        indicators: &[
            ("ATA", "ChestPainType_ATA"),
            ("NAP", "ChestPainType_NAP"),
            ("TA", "ChestPainType_TA"),
        ],
        value: field_chest_pain_type,
    },
    OneHotField {
        field: "RestingECG",
        baseline: "LVH",
        indicators: &[("Normal", "RestingECG_Normal"), ("ST", "RestingECG_ST")],
        value: field_resting_ecg,
    },
    OneHotField {
        field: "ExerciseAngina",
        baseline: "No",
        indicators: &[("Yes", "ExerciseAngina_Y")],
        value: field_exercise_angina,
    },
    OneHotField {
        field: "ST_Slope",
        baseline: "Down",
        indicators: &[("Flat", "ST_Slope_Flat"), ("Up", "ST_Slope_Up")],
        value: field_st_slope,
    },
];

/// Derived age group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBracket {
    /// age < 40
    Baseline,
    /// 40 <= age < 55
    MiddleAged,
    /// age >= 55
    Senior,
}

impl AgeBracket {
    pub const MIDDLE_AGED_COLUMN: &'static str = "AgeGroup_Middle-aged";
    pub const SENIOR_COLUMN: &'static str = "AgeGroup_Senior";

    #[must_use]
    pub fn from_age(age: i64) -> Self {
        if age < 40 {
            Self::Baseline
        } else if age < 55 {
            Self::MiddleAged
        } else {
            Self::Senior
        }
    }

    /// `(middle_aged, senior)` indicator values.
    #[must_use]
    pub fn indicators(&self) -> (f64, f64) {
        match self {
            Self::Baseline => (0.0, 0.0),
            Self::MiddleAged => (1.0, 0.0),
            Self::Senior => (0.0, 1.0),
        }
    }
}

/// Name-keyed encoder output, before alignment to the canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRow {
    entries: Vec<(&'static str, f64)>,
}

impl EncodedRow {
    #[must_use]
    pub fn get(&self, column: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, v)| *v)
    }

    /// Produced column names, in production order.
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    /// Select and order values to match `columns` exactly.
    ///
    /// Columns produced here but absent from `columns` are dropped.
    ///
    /// # Errors
    /// Returns `EncodeError::SchemaMismatch` for the first canonical column
    /// this row does not contain.
    pub fn reindex(&self, columns: &ColumnOrder) -> Result<FeatureVector, EncodeError> {
        let values = columns
            .names()
            .iter()
            .map(|column| {
                self.get(column).ok_or_else(|| EncodeError::SchemaMismatch {
                    column: column.clone(),
                })
            })
            .collect::<Result<Vec<f64>, EncodeError>>()?;
        Ok(FeatureVector::new(columns.shared(), values))
    }
}

/// Encode every column the encoder knows about, keyed by name.
#[must_use]
pub fn encode_row(record: &PatientRecord) -> EncodedRow {
    let mut entries: Vec<(&'static str, f64)> = Vec::with_capacity(18);

    entries.push(("Age", record.age as f64));
    entries.push(("RestingBP", record.resting_bp as f64));
    entries.push(("Cholesterol", record.cholesterol as f64));
    entries.push(("FastingBS", record.fasting_bs as f64));
    entries.push(("MaxHR", record.max_hr as f64));
    entries.push(("Oldpeak", record.oldpeak));
    entries.push((TARGET_PLACEHOLDER, 0.0));

    for field in &CATEGORICAL_SCHEMA {
        for (category, column) in field.indicators {
            entries.push((*column, field.indicator(record, category)));
        }
    }

    let (middle_aged, senior) = AgeBracket::from_age(record.age).indicators();
    entries.push((AgeBracket::MIDDLE_AGED_COLUMN, middle_aged));
    entries.push((AgeBracket::SENIOR_COLUMN, senior));

    EncodedRow { entries }
}

/// Encode a record into the model's feature vector.
///
/// Never fails on categorical values; fails only when `columns` names a
/// column the encoder does not produce.
///
/// # Errors
/// Returns `EncodeError::SchemaMismatch` on artifact/encoder version skew.
pub fn encode(record: &PatientRecord, columns: &ColumnOrder) -> Result<FeatureVector, EncodeError> {
    encode_row(record).reindex(columns)
}

#[cfg(test)]
pub(crate) fn training_columns() -> ColumnOrder {
    ColumnOrder::new(
        [
            "Age",
            "RestingBP",
            "Cholesterol",
            "FastingBS",
            "MaxHR",
            "Oldpeak",
            "Sex_M",
            "ChestPainType_ATA",
            "ChestPainType_NAP",
            "ChestPainType_TA",
            "RestingECG_Normal",
            "RestingECG_ST",
            "ExerciseAngina_Y",
            "ST_Slope_Flat",
            "ST_Slope_Up",
            "AgeGroup_Middle-aged",
            "AgeGroup_Senior",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect(),
    )
    .expect("valid column order")
}
