//! Artifact adapter: Loads the trained classifier, fitted scaler, and
//! canonical column list exported by the training pipeline.
//!
//! Artifacts are read once at start-up. Every shape check happens here so a
//! skewed artifact set fails the process instead of a request.
//!
//! # Integrity
//!
//! An artifact directory may carry a signed manifest:
//! - `manifest.json` binds each artifact file to its SHA-256 digest
//! - `artifacts.sig` is the Ed25519 signature over the manifest bytes
//!
//! When both are present they are always verified, and a mismatch is fatal.
//! When absent, loading continues unless the policy requires signatures.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::adapters::linear::{LinearModel, StandardScaler};
use crate::application::InferenceService;
use crate::domain::{ColumnOrder, ColumnOrderError};
use crate::HeartRiskError;

pub const MODEL_FILE: &str = "heart_model.json";
pub const SCALER_FILE: &str = "heart_scaler.json";
pub const COLUMNS_FILE: &str = "heart_columns.json";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const SIGNATURE_FILE: &str = "artifacts.sig";

/// Files a manifest must bind.
pub const ARTIFACT_FILES: [&str; 3] = [MODEL_FILE, SCALER_FILE, COLUMNS_FILE];

const MANIFEST_VERSION: u32 = 1;

/// Error type for artifact loading.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {file}: {source}")]
    Parse {
        file: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid column list: {0}")]
    Columns(#[from] ColumnOrderError),

    #[error("Artifact shape mismatch: {0}")]
    Shape(String),

    #[error("Artifacts are unsigned ({MANIFEST_FILE} or {SIGNATURE_FILE} missing) and signatures are required")]
    Unsigned,

    #[error("No artifact verification key configured")]
    MissingPublicKey,

    #[error("Invalid key or signature encoding: {0}")]
    InvalidKey(String),

    #[error("Artifact signature does not verify")]
    BadSignature,

    #[error("Invalid manifest: {0}")]
    Manifest(String),

    #[error("File hash mismatch for {0}")]
    HashMismatch(String),
}

/// How strictly artifact integrity is enforced.
#[derive(Debug, Clone, Default)]
pub struct ArtifactPolicy {
    /// Refuse to load a directory without a signed manifest.
    pub require_signed: bool,
    /// Base64 Ed25519 public key used to verify `artifacts.sig`.
    pub public_key_b64: Option<String>,
}

/// Signed description of an artifact directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub version: u32,
    /// Unix timestamp (seconds) of signing
    #[serde(default)]
    pub created_at: i64,
    /// Relative file name -> lowercase hex SHA-256
    pub files: BTreeMap<String, String>,
}

impl ArtifactManifest {
    /// Hash every artifact file in `dir`.
    ///
    /// # Errors
    /// Returns `ArtifactError::Read` if an artifact file is missing.
    pub fn for_dir(dir: &Path, created_at: i64) -> Result<Self, ArtifactError> {
        let mut files = BTreeMap::new();
        for rel in ARTIFACT_FILES {
            let bytes = read_file(&dir.join(rel))?;
            files.insert(rel.to_string(), sha256_hex(&bytes));
        }
        Ok(Self {
            version: MANIFEST_VERSION,
            created_at,
            files,
        })
    }
}

/// The three artifacts the inference service is built from.
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    pub model: LinearModel,
    pub scaler: StandardScaler,
    pub columns: ColumnOrder,
    /// Whether a signed manifest was verified for this set.
    pub verified: bool,
}

impl ArtifactSet {
    /// Wire the loaded artifacts into an inference service.
    ///
    /// # Errors
    /// Returns `HeartRiskError::Validation` on a feature width mismatch.
    pub fn into_service(self) -> Result<InferenceService<StandardScaler, LinearModel>, HeartRiskError> {
        InferenceService::new(Arc::new(self.scaler), Arc::new(self.model), self.columns)
    }
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

// Constant-time compare for ASCII strings (used for SHA-256 hex digests).
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

fn read_file(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    fs::read(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: &'static str) -> Result<T, ArtifactError> {
    let bytes = read_file(&dir.join(file))?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse { file, source })
}

/// Decode a base64 Ed25519 public key.
///
/// # Errors
/// Returns `ArtifactError::InvalidKey` for bad base64, wrong length, or an
/// invalid curve point.
pub fn verifying_key_from_b64(b64: &str) -> Result<VerifyingKey, ArtifactError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|_| ArtifactError::InvalidKey("public key is not valid base64".into()))?;
    let key: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
        ArtifactError::InvalidKey(format!(
            "public key must be 32 bytes, got {}",
            bytes.len()
        ))
    })?;
    VerifyingKey::from_bytes(&key)
        .map_err(|_| ArtifactError::InvalidKey("public key is not a valid Ed25519 point".into()))
}

/// Verify the signed manifest in `dir`, if any.
///
/// Returns `Ok(true)` when a manifest was verified, `Ok(false)` when the
/// directory is unsigned and the policy allows it.
///
/// # Errors
/// Returns `ArtifactError` on any signature, manifest, or digest failure.
pub fn verify_manifest(dir: &Path, policy: &ArtifactPolicy) -> Result<bool, ArtifactError> {
    let manifest_path = dir.join(MANIFEST_FILE);
    let sig_path = dir.join(SIGNATURE_FILE);

    if !manifest_path.exists() || !sig_path.exists() {
        if policy.require_signed {
            tracing::error!("Artifact signature not found in {:?}", dir);
            return Err(ArtifactError::Unsigned);
        }
        tracing::warn!("Loading UNSIGNED artifacts from {:?}", dir);
        return Ok(false);
    }

    let public_key = policy
        .public_key_b64
        .as_deref()
        .ok_or(ArtifactError::MissingPublicKey)
        .and_then(verifying_key_from_b64)?;

    let sig_bytes = read_file(&sig_path)?;
    let sig_bytes: [u8; 64] = sig_bytes.as_slice().try_into().map_err(|_| {
        ArtifactError::InvalidKey("signature must be 64 bytes".into())
    })?;
    let signature = Signature::from_bytes(&sig_bytes);

    let manifest_bytes = read_file(&manifest_path)?;
    public_key
        .verify(&manifest_bytes, &signature)
        .map_err(|_| ArtifactError::BadSignature)?;

    let manifest: ArtifactManifest = serde_json::from_slice(&manifest_bytes)
        .map_err(|e| ArtifactError::Manifest(e.to_string()))?;
    if manifest.version != MANIFEST_VERSION {
        return Err(ArtifactError::Manifest(format!(
            "unsupported version {}",
            manifest.version
        )));
    }

    for rel in ARTIFACT_FILES {
        let expected = manifest
            .files
            .get(rel)
            .ok_or_else(|| ArtifactError::Manifest(format!("{rel} is not bound")))?;
        let actual = sha256_hex(&read_file(&dir.join(rel))?);
        if !constant_time_eq_str(&actual, expected) {
            return Err(ArtifactError::HashMismatch(rel.to_string()));
        }
    }

    tracing::info!("Artifact signature and hashes verified");
    Ok(true)
}

fn check_shapes(
    columns: &ColumnOrder,
    scaler: &StandardScaler,
    model: &LinearModel,
) -> Result<(), ArtifactError> {
    let n = columns.len();
    if scaler.mean.len() != n || scaler.scale.len() != n {
        return Err(ArtifactError::Shape(format!(
            "scaler has {} means and {} scales for {n} columns",
            scaler.mean.len(),
            scaler.scale.len()
        )));
    }
    if model.coefficients.len() != n {
        return Err(ArtifactError::Shape(format!(
            "model has {} coefficients for {n} columns",
            model.coefficients.len()
        )));
    }
    if let Some(fitted) = &scaler.feature_names {
        if fitted.as_slice() != columns.names() {
            return Err(ArtifactError::Shape(
                "scaler feature_names differ from the canonical column order".into(),
            ));
        }
    }
    let finite = |v: &[f64]| v.iter().all(|x| x.is_finite());
    if !finite(&scaler.mean) || !finite(&scaler.scale) || !finite(&model.coefficients)
        || !model.intercept.is_finite()
    {
        return Err(ArtifactError::Shape("non-finite parameter".into()));
    }
    Ok(())
}

/// Load and cross-check the artifact set in `dir`.
///
/// # Errors
/// Returns `ArtifactError` if verification, parsing, or shape checks fail.
pub fn load_artifacts(dir: &Path, policy: &ArtifactPolicy) -> Result<ArtifactSet, ArtifactError> {
    let verified = verify_manifest(dir, policy)?;

    let names: Vec<String> = read_json(dir, COLUMNS_FILE)?;
    let columns = ColumnOrder::new(names)?;
    let scaler: StandardScaler = read_json(dir, SCALER_FILE)?;
    let model: LinearModel = read_json(dir, MODEL_FILE)?;

    check_shapes(&columns, &scaler, &model)?;

    tracing::info!(
        "Loaded artifacts from {:?} (kind={:?}, n_features={}, verified={})",
        dir,
        model.kind,
        columns.len(),
        verified
    );

    Ok(ArtifactSet {
        model,
        scaler,
        columns,
        verified,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::linear::ModelKind;
    use crate::domain::sample_record;
    use ed25519_dalek::{Signer, SigningKey};
    use rand::RngCore;
    use tempfile::tempdir;

    fn write_json<T: Serialize>(dir: &Path, file: &str, value: &T) {
        let json = serde_json::to_vec_pretty(value).expect("serialize");
        fs::write(dir.join(file), json).expect("write");
    }

    fn write_artifacts(dir: &Path, n: usize) {
        let columns: Vec<String> = (0..n).map(|i| format!("f{i}")).collect();
        write_json(dir, COLUMNS_FILE, &columns);
        write_json(
            dir,
            SCALER_FILE,
            &StandardScaler::new(vec![0.0; n], vec![1.0; n]),
        );
        write_json(
            dir,
            MODEL_FILE,
            &LinearModel::new(ModelKind::LogisticRegression, vec![0.5; n], -0.1),
        );
    }

    fn signing_key() -> SigningKey {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        SigningKey::from_bytes(&seed)
    }

    fn sign_dir(dir: &Path, key: &SigningKey) {
        let manifest = ArtifactManifest::for_dir(dir, 1_700_000_000).expect("manifest");
        let bytes = serde_json::to_vec_pretty(&manifest).expect("serialize");
        fs::write(dir.join(MANIFEST_FILE), &bytes).expect("write manifest");
        let signature: Signature = key.sign(&bytes);
        fs::write(dir.join(SIGNATURE_FILE), signature.to_bytes()).expect("write sig");
    }

    fn policy_for(key: &SigningKey, require_signed: bool) -> ArtifactPolicy {
        ArtifactPolicy {
            require_signed,
            public_key_b64: Some(
                base64::engine::general_purpose::STANDARD
                    .encode(key.verifying_key().to_bytes()),
            ),
        }
    }

    #[test]
    fn test_load_unsigned_artifacts() {
        let temp = tempdir().expect("tempdir");
        write_artifacts(temp.path(), 3);

        let set = load_artifacts(temp.path(), &ArtifactPolicy::default()).expect("load");
        assert_eq!(set.columns.len(), 3);
        assert!(!set.verified);
    }

    #[test]
    fn test_bundled_artifacts_are_consistent() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("models");
        let set = load_artifacts(&dir, &ArtifactPolicy::default()).expect("bundled artifacts");
        assert_eq!(set.columns.len(), 17);
        assert_eq!(set.model.kind, ModelKind::LogisticRegression);
    }

    #[test]
    fn test_bundled_service_predicts_reference_record() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("models");
        let service = load_artifacts(&dir, &ArtifactPolicy::default())
            .expect("bundled artifacts")
            .into_service()
            .expect("service");

        let result = service.predict(&sample_record()).expect("predict");
        let p = result.probability.expect("logistic regression exposes probability");
        assert!((0.0..=1.0).contains(&p));
        assert_eq!(result.prediction, u8::from(p > 0.5));
    }

    #[test]
    fn test_unsigned_artifacts_rejected_when_required() {
        let temp = tempdir().expect("tempdir");
        write_artifacts(temp.path(), 2);
        let policy = ArtifactPolicy {
            require_signed: true,
            public_key_b64: None,
        };
        let err = load_artifacts(temp.path(), &policy).expect_err("must fail");
        assert!(matches!(err, ArtifactError::Unsigned));
    }

    #[test]
    fn test_signed_artifacts_verify() {
        let temp = tempdir().expect("tempdir");
        write_artifacts(temp.path(), 2);
        let key = signing_key();
        sign_dir(temp.path(), &key);

        let set = load_artifacts(temp.path(), &policy_for(&key, true)).expect("load");
        assert!(set.verified);
    }

    #[test]
    fn test_tampered_artifact_fails_hash_check() {
        let temp = tempdir().expect("tempdir");
        write_artifacts(temp.path(), 2);
        let key = signing_key();
        sign_dir(temp.path(), &key);

        write_json(temp.path(), COLUMNS_FILE, &vec!["f1", "f0"]);

        let err = load_artifacts(temp.path(), &policy_for(&key, false)).expect_err("must fail");
        assert!(matches!(err, ArtifactError::HashMismatch(ref f) if f == COLUMNS_FILE));
    }

    #[test]
    fn test_wrong_key_fails_signature_check() {
        let temp = tempdir().expect("tempdir");
        write_artifacts(temp.path(), 2);
        sign_dir(temp.path(), &signing_key());

        let err =
            load_artifacts(temp.path(), &policy_for(&signing_key(), false)).expect_err("must fail");
        assert!(matches!(err, ArtifactError::BadSignature));
    }

    #[test]
    fn test_signed_directory_without_key_fails() {
        let temp = tempdir().expect("tempdir");
        write_artifacts(temp.path(), 2);
        sign_dir(temp.path(), &signing_key());

        let err = load_artifacts(temp.path(), &ArtifactPolicy::default()).expect_err("must fail");
        assert!(matches!(err, ArtifactError::MissingPublicKey));
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let temp = tempdir().expect("tempdir");
        write_artifacts(temp.path(), 3);
        write_json(
            temp.path(),
            MODEL_FILE,
            &LinearModel::new(ModelKind::LogisticRegression, vec![0.5; 2], 0.0),
        );

        let err = load_artifacts(temp.path(), &ArtifactPolicy::default()).expect_err("must fail");
        assert!(matches!(err, ArtifactError::Shape(_)));
    }

    #[test]
    fn test_scaler_feature_names_must_match_order() {
        let temp = tempdir().expect("tempdir");
        write_artifacts(temp.path(), 2);
        let mut scaler = StandardScaler::new(vec![0.0; 2], vec![1.0; 2]);
        scaler.feature_names = Some(vec!["f1".into(), "f0".into()]);
        write_json(temp.path(), SCALER_FILE, &scaler);

        let err = load_artifacts(temp.path(), &ArtifactPolicy::default()).expect_err("must fail");
        assert!(matches!(err, ArtifactError::Shape(_)));
    }

    #[test]
    fn test_duplicate_columns_are_rejected() {
        let temp = tempdir().expect("tempdir");
        write_artifacts(temp.path(), 2);
        write_json(temp.path(), COLUMNS_FILE, &vec!["f0", "f0"]);

        let err = load_artifacts(temp.path(), &ArtifactPolicy::default()).expect_err("must fail");
        assert!(matches!(err, ArtifactError::Columns(ColumnOrderError::Duplicate(_))));
    }

    #[test]
    fn test_missing_artifact_is_read_error() {
        let temp = tempdir().expect("tempdir");
        let err = load_artifacts(temp.path(), &ArtifactPolicy::default()).expect_err("must fail");
        assert!(matches!(err, ArtifactError::Read { .. }));
    }

    #[test]
    fn test_verifying_key_rejects_bad_length() {
        let short = base64::engine::general_purpose::STANDARD.encode([1u8; 16]);
        assert!(matches!(
            verifying_key_from_b64(&short),
            Err(ArtifactError::InvalidKey(_))
        ));
    }
}
