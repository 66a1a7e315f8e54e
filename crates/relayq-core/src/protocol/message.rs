use std::sync::Arc;

use crate::envelope::{CorrelationId, RequestEnvelope};

/// Message forwarded from the client to the worker.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    /// Run the enclosed request and answer with a response frame.
    Perform(Arc<RequestEnvelope>),
    /// Advisory: stop working on this id if it has not finished yet.
    Cancel(CorrelationId),
}

impl WorkerMessage {
    pub fn correlation_id(&self) -> &CorrelationId {
        match self {
            WorkerMessage::Perform(env) => env.correlation_id(),
            WorkerMessage::Cancel(id) => id,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerMessage::Perform(_) => "perform",
            WorkerMessage::Cancel(_) => "cancel",
        }
    }
}
