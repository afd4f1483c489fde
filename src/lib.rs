//! # heartrisk
//!
//! Heart-disease risk inference service and its resilient client.
//!
//! This crate provides:
//! - A deterministic feature encoder for the exported heart-disease model
//! - Artifact loading with optional Ed25519-signed manifests
//! - An HTTP prediction service
//! - A client that rides out cold starts with a fixed retry policy
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (PatientRecord, encoder, PredictionResult)
//! - `ports`: Trait definitions for the model and the network
//! - `adapters`: Concrete implementations (linear model, artifacts, reqwest, log sanitizer)
//! - `application`: Use cases orchestrating domain and ports
//! - `server`: The axum HTTP surface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;
pub mod server;

pub use domain::{PatientRecord, PredictionResult};

/// Result type for heartrisk operations
pub type Result<T> = std::result::Result<T, HeartRiskError>;

/// Main error type for heartrisk
#[derive(Debug, thiserror::Error)]
pub enum HeartRiskError {
    #[error("Artifact error: {0}")]
    Artifact(#[from] adapters::ArtifactError),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
