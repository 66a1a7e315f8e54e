//! Client wiring: one dispatch queue, its response router, and metrics for a
//! single logical worker endpoint.

use std::sync::Arc;

use bytes::Bytes;

use relayq_core::error::Result;
use relayq_core::CorrelationId;

use crate::config::ClientConfig;
use crate::dispatch::{DispatchQueue, QueueSnapshot};
use crate::obs::ClientMetrics;
use crate::pressure::PressureSink;
use crate::router::{DeliveryReceiver, Responder, ResponseRouter};
use crate::transport::Transport;

#[derive(Clone)]
pub struct RelayClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    cfg: ClientConfig,
    queue: Arc<DispatchQueue>,
    router: ResponseRouter,
    metrics: Arc<ClientMetrics>,
}

impl RelayClient {
    /// Build the client. Deliveries for every resolved request arrive on the
    /// returned receiver; where it is drained is up to the caller.
    pub fn new(cfg: ClientConfig, sink: Arc<dyn PressureSink>) -> Result<(Self, DeliveryReceiver)> {
        cfg.validate()?;

        let metrics = Arc::new(ClientMetrics::default());
        let queue = Arc::new(DispatchQueue::new(&cfg.queue, sink, Arc::clone(&metrics)));
        let (router, deliveries) = ResponseRouter::new(Arc::clone(&queue), Arc::clone(&metrics));

        tracing::debug!(
            pending_warning_threshold = cfg.queue.pending_warning_threshold,
            resend_in_flight_on_reconnect = cfg.queue.resend_in_flight_on_reconnect,
            "relay client created"
        );

        let client = Self {
            inner: Arc::new(ClientInner {
                cfg,
                queue,
                router,
                metrics,
            }),
        };
        Ok((client, deliveries))
    }

    pub fn cfg(&self) -> &ClientConfig {
        &self.inner.cfg
    }

    pub fn queue(&self) -> Arc<DispatchQueue> {
        Arc::clone(&self.inner.queue)
    }

    pub fn metrics(&self) -> Arc<ClientMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    pub fn responder(&self) -> Responder {
        self.inner.router.responder()
    }

    pub fn submit(&self, payload: impl Into<Bytes>) -> CorrelationId {
        self.inner.queue.submit(payload)
    }

    pub fn cancel(&self, id: &CorrelationId) {
        self.inner.queue.cancel(id)
    }

    pub fn is_pending(&self, id: &CorrelationId) -> bool {
        self.inner.queue.is_pending(id)
    }

    pub fn cancel_all_unsubmitted(&self) {
        self.inner.queue.cancel_all_unsubmitted()
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        self.inner.queue.snapshot()
    }

    /// Open a channel through `transport` and flush the backlog into it.
    pub async fn connect(&self, transport: &dyn Transport) -> Result<()> {
        let channel = transport.connect(self.responder()).await?;
        self.inner.queue.on_connected(channel);
        Ok(())
    }

    pub fn disconnect(&self) {
        self.inner.queue.on_disconnected();
    }

    /// Teardown: drop the channel and discard all local bookkeeping.
    pub fn shutdown(&self) {
        self.inner.queue.on_disconnected();
        self.inner.queue.cancel_all_unsubmitted();
    }

    /// Prometheus text including current backlog and in-flight sizes.
    pub fn metrics_text(&self) -> String {
        let snap = self.snapshot();
        let extra = [
            ("relayq_backlog", snap.backlog as u64),
            ("relayq_in_flight", snap.in_flight as u64),
            ("relayq_connected", u64::from(snap.connected)),
        ];
        self.inner.metrics.render(&extra)
    }
}
