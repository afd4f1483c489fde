//! Signs an artifact directory for verified loading.
//!
//! Writes `manifest.json` (SHA-256 of each artifact file) and `artifacts.sig`
//! (Ed25519 signature over the manifest bytes) next to the artifacts.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin sign_artifacts -- models --key-file signing.seed
//! ```
//!
//! The seed is the base64 32-byte file written by `generate_keypair`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose;
use base64::Engine;
use clap::Parser;
use ed25519_dalek::{Signer, SigningKey};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use heartrisk::adapters::artifacts::{ArtifactManifest, MANIFEST_FILE, SIGNATURE_FILE};

#[derive(Debug, Parser)]
#[command(name = "sign_artifacts", about = "Sign a heartrisk artifact directory")]
struct Args {
    /// Directory holding heart_model.json, heart_scaler.json and heart_columns.json
    artifact_dir: PathBuf,

    /// File containing the base64 Ed25519 seed
    #[arg(long, env = "HEARTRISK_SIGNING_KEY_B64_FILE")]
    key_file: PathBuf,
}

#[derive(Zeroize, ZeroizeOnDrop)]
struct Seed([u8; 32]);

fn read_seed(path: &Path) -> Result<Seed> {
    let content = Zeroizing::new(
        fs::read_to_string(path).with_context(|| format!("failed reading signing key {path:?}"))?,
    );
    let raw = Zeroizing::new(
        general_purpose::STANDARD
            .decode(content.trim())
            .context("signing key is not valid base64")?,
    );
    if raw.len() != 32 {
        bail!(
            "signing key seed must be 32 bytes after base64 decode (got {})",
            raw.len()
        );
    }
    let mut seed = Seed([0u8; 32]);
    seed.0.copy_from_slice(&raw);
    Ok(seed)
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let seed = read_seed(&args.key_file)?;
    let signing_key = SigningKey::from_bytes(&seed.0);
    drop(seed);

    let manifest = ArtifactManifest::for_dir(&args.artifact_dir, unix_now())?;
    let manifest_bytes =
        serde_json::to_vec_pretty(&manifest).context("failed to serialize manifest")?;

    let manifest_path = args.artifact_dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, &manifest_bytes)
        .with_context(|| format!("failed to write {manifest_path:?}"))?;

    let signature = signing_key.sign(&manifest_bytes);
    let sig_path = args.artifact_dir.join(SIGNATURE_FILE);
    fs::write(&sig_path, signature.to_bytes())
        .with_context(|| format!("failed to write {sig_path:?}"))?;

    println!("Signed {} artifact file(s)", manifest.files.len());
    println!("Wrote manifest: {manifest_path:?}");
    println!("Wrote signature: {sig_path:?}");
    println!(
        "HEARTRISK_ARTIFACT_PUBKEY_B64={}",
        general_purpose::STANDARD.encode(signing_key.verifying_key().as_bytes())
    );
    Ok(())
}
