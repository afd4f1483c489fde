//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (loaded model artifacts,
//! the network, the clock).

mod model;
mod transport;

pub use model::{Classifier, Scaler};
pub use transport::{PredictTransport, Sleeper, ThreadSleeper, TransportError, TransportReply};
