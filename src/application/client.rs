//! Resilient client: drives one predict action through a fixed retry policy.
//!
//! The target failure mode is a cold-starting remote instance, so the policy
//! is deliberately flat: fixed attempt count, fixed delay, no jitter.
//! Only transport failures are retried. A reachable service answering with
//! an error status is surfaced immediately.

use std::time::Duration;

use crate::domain::{PatientRecord, PredictionResult};
use crate::ports::{PredictTransport, Sleeper, TransportError};

pub const DEFAULT_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client-side failure taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("Prediction service unreachable after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error("Prediction service returned status {status}")]
    Remote { status: u16 },

    #[error("Unreadable prediction response: {0}")]
    Decode(String),
}

/// Attempt count, inter-attempt delay and per-attempt timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    delay: Duration,
    timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// `attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(attempts: u32, delay: Duration, timeout: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
            timeout,
        }
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Upper bound on one predict action: `attempts × (timeout + delay)`.
    #[must_use]
    pub fn max_duration(&self) -> Duration {
        (self.timeout + self.delay).saturating_mul(self.attempts)
    }
}

/// States of one predict action.
#[derive(Debug, Clone, PartialEq)]
pub enum CallState {
    Idle,
    Sending { attempt: u32 },
    Backoff { attempt: u32, error: TransportError },
    Succeeded(PredictionResult),
    Failed(ClientError),
}

impl CallState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }
}

pub struct ResilientClient<T, Z>
where
    T: PredictTransport,
    Z: Sleeper,
{
    transport: T,
    sleeper: Z,
    policy: RetryPolicy,
}

impl<T, Z> ResilientClient<T, Z>
where
    T: PredictTransport,
    Z: Sleeper,
{
    pub fn new(transport: T, sleeper: Z, policy: RetryPolicy) -> Self {
        Self {
            transport,
            sleeper,
            policy,
        }
    }

    /// Run one predict action to a terminal state.
    ///
    /// # Errors
    /// Returns the `ClientError` carried by the `Failed` state.
    pub fn predict(&self, record: &PatientRecord) -> Result<PredictionResult, ClientError> {
        self.predict_observed(record, |_| {})
    }

    /// Like `predict`, reporting every state entered to `observe`.
    ///
    /// # Errors
    /// Returns the `ClientError` carried by the `Failed` state.
    pub fn predict_observed<F>(&self, record: &PatientRecord, mut observe: F) -> Result<PredictionResult, ClientError>
    where
        F: FnMut(&CallState),
    {
        let mut state = CallState::Idle;
        loop {
            observe(&state);
            state = match state {
                CallState::Idle => CallState::Sending { attempt: 1 },
                CallState::Sending { attempt } => self.send(record, attempt),
                CallState::Backoff { attempt, error } => {
                    tracing::warn!(
                        "Attempt {}/{} failed ({}); retrying in {:?}",
                        attempt,
                        self.policy.attempts,
                        error,
                        self.policy.delay
                    );
                    self.sleeper.sleep(self.policy.delay);
                    CallState::Sending {
                        attempt: attempt + 1,
                    }
                }
                CallState::Succeeded(result) => return Ok(result),
                CallState::Failed(error) => return Err(error),
            };
        }
    }

    fn send(&self, record: &PatientRecord, attempt: u32) -> CallState {
        match self.transport.post_predict(record) {
            Ok(reply) if reply.is_success() => match serde_json::from_slice::<PredictionResult>(&reply.body) {
                Ok(result) if result.is_well_formed() => CallState::Succeeded(result),
                Ok(_) => CallState::Failed(ClientError::Decode(
                    "label must be 0 or 1 and probability within [0, 1]".to_string(),
                )),
                Err(e) => CallState::Failed(ClientError::Decode(e.to_string())),
            },
            Ok(reply) => {
                tracing::error!("Prediction service answered with status {}", reply.status);
                CallState::Failed(ClientError::Remote {
                    status: reply.status,
                })
            }
            Err(error) if attempt < self.policy.attempts => CallState::Backoff { attempt, error },
            Err(source) => {
                tracing::error!("Giving up after {} attempt(s): {}", attempt, source);
                CallState::Failed(ClientError::Transport {
                    attempts: attempt,
                    source,
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Positive prediction.
    Alert,
    /// Negative prediction.
    Clear,
    /// Service reachable but the answer is unusable.
    Warning,
    /// Service unreachable.
    Error,
}

/// User-facing outcome of a predict action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub severity: Severity,
    pub text: String,
}

fn format_probability(probability: Option<f64>) -> String {
    match probability {
        Some(p) => format!("{p:.2}"),
        None => "unknown".to_string(),
    }
}

/// Turn a terminal outcome into a message. Every outcome renders.
#[must_use]
pub fn render(outcome: &Result<PredictionResult, ClientError>) -> Rendered {
    match outcome {
        Ok(result) => {
            let probability = format_probability(result.probability);
            if result.is_positive() {
                Rendered {
                    severity: Severity::Alert,
                    text: format!("High Risk of Heart Disease\nProbability: {probability}"),
                }
            } else {
                Rendered {
                    severity: Severity::Clear,
                    text: format!("No Heart Disease Detected\nProbability: {probability}"),
                }
            }
        }
        Err(ClientError::Remote { .. } | ClientError::Decode(_)) => Rendered {
            severity: Severity::Warning,
            text: "Prediction service returned an error. Check backend.".to_string(),
        },
        Err(ClientError::Transport { attempts, source }) => Rendered {
            severity: Severity::Error,
            text: format!("Error connecting to prediction service after {attempts} attempt(s): {source}"),
        },
    }
}
