//! Transport seam between the dispatch queue and a worker.
//!
//! The queue only needs a non-blocking `send`; how bytes reach the worker
//! (socket, pipe, in-process queue) is up to the implementation. Inbound
//! responses flow the other way through the `Responder` handed to `connect`.

pub mod local;

use std::sync::Arc;

use async_trait::async_trait;

use relayq_core::error::Result;
use relayq_core::protocol::WorkerMessage;

use crate::router::Responder;

/// Outbound half of a live connection.
///
/// `send` is called with the dispatch queue lock held: it must not block or
/// await. Report failure instead of retrying.
pub trait Channel: Send + Sync {
    fn send(&self, msg: WorkerMessage) -> Result<()>;
}

/// Establishes connections to the worker.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a channel; response frames for it must be handed to `responder`.
    async fn connect(&self, responder: Responder) -> Result<Arc<dyn Channel>>;
}

pub use local::{LocalChannel, LocalListener, LocalTransport, WorkerLink};
