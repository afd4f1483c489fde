//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with external pieces:
//! - `artifacts`: loading and verifying the exported model artifacts
//! - `linear`: the fitted scaler and linear classifier
//! - `http`: reqwest transport for the resilient client
//! - `sanitize`: patient-data filtering for logs

pub mod artifacts;
pub mod http;
pub mod linear;
pub mod sanitize;

pub use artifacts::ArtifactError;
