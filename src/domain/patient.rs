//! Patient record types for heart-disease risk prediction.
//!
//! `PatientRecord` is the wire shape of a prediction request. Categorical
//! attributes are kept as raw strings: the encoder, not the deserializer,
//! decides what an unknown category means.

use serde::{Deserialize, Serialize};

/// Raw patient attributes as submitted to the prediction endpoint.
///
/// Field names follow the training dataset's column names exactly.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Age in years
    #[serde(rename = "Age")]
    pub age: i64,

    /// Resting blood pressure in mmHg
    #[serde(rename = "RestingBP")]
    pub resting_bp: i64,

    /// Serum cholesterol in mg/dL
    #[serde(rename = "Cholesterol")]
    pub cholesterol: i64,

    /// Fasting blood sugar > 120 mg/dL: 0 = no, 1 = yes
    #[serde(rename = "FastingBS")]
    pub fasting_bs: i64,

    /// Maximum heart rate achieved
    #[serde(rename = "MaxHR")]
    pub max_hr: i64,

    /// ST depression induced by exercise relative to rest
    #[serde(rename = "Oldpeak")]
    pub oldpeak: f64,

    /// "Male" | "Female"
    #[serde(rename = "Sex")]
    pub sex: String,

    /// "ATA" | "NAP" | "TA" | "ASY"
    #[serde(rename = "ChestPainType")]
    pub chest_pain_type: String,

    /// "Normal" | "ST" | "LVH"
    #[serde(rename = "RestingECG")]
    pub resting_ecg: String,

    /// "Yes" | "No"
    #[serde(rename = "ExerciseAngina")]
    pub exercise_angina: String,

    /// "Up" | "Flat" | "Down"
    #[serde(rename = "ST_Slope")]
    pub st_slope: String,
}

// Values are health data; never let them reach a log line through `{:?}`.
impl std::fmt::Debug for PatientRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatientRecord")
            .field("fields", &"[REDACTED]")
            .finish()
    }
}

/// Biological sex as collected by the client form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    #[must_use]
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

/// Chest pain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChestPainType {
    /// Atypical angina
    Ata,
    /// Non-anginal pain
    Nap,
    /// Typical angina
    Ta,
    /// Asymptomatic
    Asy,
}

impl ChestPainType {
    #[must_use]
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Ata => "ATA",
            Self::Nap => "NAP",
            Self::Ta => "TA",
            Self::Asy => "ASY",
        }
    }
}

/// Resting electrocardiogram result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestingEcg {
    Normal,
    /// ST-T wave abnormality
    St,
    /// Left ventricular hypertrophy
    Lvh,
}

impl RestingEcg {
    #[must_use]
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::St => "ST",
            Self::Lvh => "LVH",
        }
    }
}

/// Exercise-induced angina.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseAngina {
    Yes,
    No,
}

impl ExerciseAngina {
    #[must_use]
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }
}

/// Slope of the peak exercise ST segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StSlope {
    Up,
    Flat,
    Down,
}

impl StSlope {
    #[must_use]
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Up => "Up",
            Self::Flat => "Flat",
            Self::Down => "Down",
        }
    }
}

/// Typed categorical attributes, used to build a record from a closed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Categoricals {
    pub sex: Sex,
    pub chest_pain_type: ChestPainType,
    pub resting_ecg: RestingEcg,
    pub exercise_angina: ExerciseAngina,
    pub st_slope: StSlope,
}

/// Numeric attributes, in wire units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vitals {
    pub age: i64,
    pub resting_bp: i64,
    pub cholesterol: i64,
    pub fasting_bs: bool,
    pub max_hr: i64,
    pub oldpeak: f64,
}

impl PatientRecord {
    /// Build a record from typed attributes.
    #[must_use]
    pub fn new(vitals: Vitals, categoricals: Categoricals) -> Self {
        Self {
            age: vitals.age,
            resting_bp: vitals.resting_bp,
            cholesterol: vitals.cholesterol,
            fasting_bs: i64::from(vitals.fasting_bs),
            max_hr: vitals.max_hr,
            oldpeak: vitals.oldpeak,
            sex: categoricals.sex.as_wire().to_string(),
            chest_pain_type: categoricals.chest_pain_type.as_wire().to_string(),
            resting_ecg: categoricals.resting_ecg.as_wire().to_string(),
            exercise_angina: categoricals.exercise_angina.as_wire().to_string(),
            st_slope: categoricals.st_slope.as_wire().to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_record() -> PatientRecord {
    PatientRecord::new(
        Vitals {
            age: 63,
            resting_bp: 145,
            cholesterol: 233,
            fasting_bs: true,
            max_hr: 150,
            oldpeak: 2.3,
        },
        Categoricals {
            sex: Sex::Male,
            chest_pain_type: ChestPainType::Ta,
            resting_ecg: RestingEcg::Normal,
            exercise_angina: ExerciseAngina::No,
            st_slope: StSlope::Up,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(sample_record()).expect("serialize");
        assert_eq!(json["Age"], 63);
        assert_eq!(json["FastingBS"], 1);
        assert_eq!(json["ChestPainType"], "TA");
        assert_eq!(json["ST_Slope"], "Up");
        assert_eq!(json.as_object().map(|o| o.len()), Some(11));
    }

    #[test]
    fn test_deserialize_ignores_extra_keys_and_keeps_unknown_categories() {
        let body = r#"{
            "Age": 45, "RestingBP": 130, "Cholesterol": 210, "FastingBS": 0,
            "MaxHR": 160, "Oldpeak": -0.5, "Sex": "Other", "ChestPainType": "XYZ",
            "RestingECG": "Normal", "ExerciseAngina": "No", "ST_Slope": "Flat",
            "Comment": "ignored"
        }"#;
        let record: PatientRecord = serde_json::from_str(body).expect("deserialize");
        assert_eq!(record.sex, "Other");
        assert_eq!(record.chest_pain_type, "XYZ");
        assert!((record.oldpeak + 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let body = r#"{"Age": 45, "RestingBP": 130}"#;
        assert!(serde_json::from_str::<PatientRecord>(body).is_err());
    }

    #[test]
    fn test_debug_redacts_values() {
        let rendered = format!("{:?}", sample_record());
        assert!(!rendered.contains("63"));
        assert!(!rendered.contains("Male"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
