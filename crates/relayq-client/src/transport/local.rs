//! In-process transport backed by tokio channels.
//!
//! Each `connect` creates a bounded request queue and hands its receiving end,
//! together with the client's `Responder`, to the `LocalListener`. Useful for
//! embedding a worker in the same process and for tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use relayq_core::error::{RelayError, Result};
use relayq_core::protocol::WorkerMessage;

use crate::config::TransportSection;
use crate::router::Responder;
use crate::transport::{Channel, Transport};

/// Worker-side view of one connection.
pub struct WorkerLink {
    pub requests: mpsc::Receiver<WorkerMessage>,
    /// Reply-to handle: response frames go here.
    pub responder: Responder,
}

pub struct LocalTransport {
    accept_tx: mpsc::UnboundedSender<WorkerLink>,
    capacity: usize,
}

impl LocalTransport {
    /// `capacity` bounds each connection's request queue (min 1).
    pub fn new(capacity: usize) -> (Self, LocalListener) {
        let (accept_tx, accept_rx) = mpsc::unbounded_channel();
        (
            Self {
                accept_tx,
                capacity: capacity.max(1),
            },
            LocalListener { accept_rx },
        )
    }

    pub fn from_config(cfg: &TransportSection) -> (Self, LocalListener) {
        Self::new(cfg.channel_capacity)
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn connect(&self, responder: Responder) -> Result<Arc<dyn Channel>> {
        let (tx, requests) = mpsc::channel(self.capacity);
        self.accept_tx
            .send(WorkerLink { requests, responder })
            .map_err(|_| RelayError::TransportSend("worker listener closed".into()))?;
        Ok(Arc::new(LocalChannel { tx }))
    }
}

/// Accepts connections on the worker side.
pub struct LocalListener {
    accept_rx: mpsc::UnboundedReceiver<WorkerLink>,
}

impl LocalListener {
    /// Next connection; `None` once the transport is dropped.
    pub async fn accept(&mut self) -> Option<WorkerLink> {
        self.accept_rx.recv().await
    }
}

pub struct LocalChannel {
    tx: mpsc::Sender<WorkerMessage>,
}

impl Channel for LocalChannel {
    fn send(&self, msg: WorkerMessage) -> Result<()> {
        self.tx.try_send(msg).map_err(|e| match e {
            TrySendError::Full(_) => RelayError::TransportSend("worker queue full".into()),
            TrySendError::Closed(_) => RelayError::TransportSend("worker channel closed".into()),
        })
    }
}
