//! relayq core: transport-agnostic primitives for the client-side dispatch queue.
//!
//! This crate defines the request envelope, correlation ids, worker wire
//! messages, and the error surface shared by the client runtime and worker
//! implementations. It carries no runtime dependencies so a worker can decode
//! and encode frames without pulling in the client.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed inbound frames surface as `RelayError` instead of crashing the
//! receiving thread.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod envelope;
pub mod error;
pub mod protocol;

pub use envelope::{CorrelationId, RequestEnvelope};
/// Shared result type.
pub use error::{RelayError, Result};
