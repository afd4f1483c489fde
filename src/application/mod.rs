//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the two use cases: serving predictions and requesting them.

mod client;
mod inference;

pub use client::{
    render, CallState, ClientError, Rendered, ResilientClient, RetryPolicy, Severity,
    DEFAULT_ATTEMPTS, DEFAULT_RETRY_DELAY, DEFAULT_TIMEOUT,
};
pub use inference::InferenceService;
