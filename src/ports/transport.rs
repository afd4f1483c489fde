//! Client ports: How the resilient client reaches the service and waits.
//!
//! Both are injected so the retry policy can be tested without a network
//! or real delays.

use std::time::Duration;

use crate::domain::PatientRecord;

/// Network-level failure: the request never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Transport failure: {0}")]
    Other(String),
}

/// Raw HTTP response from the prediction endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportReply {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Sends one prediction request.
pub trait PredictTransport {
    /// Post a record to the prediction endpoint.
    ///
    /// Any HTTP status is `Ok`; only failures to get a response are `Err`.
    ///
    /// # Errors
    /// Returns `TransportError` on connection failure or timeout.
    fn post_predict(&self, record: &PatientRecord) -> Result<TransportReply, TransportError>;
}

/// Blocking wait between attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// `Sleeper` backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
