//! Response router: matches inbound frames to outstanding requests.
//!
//! Transports call into a `Responder` from whatever thread receives data.
//! The router decodes the frame, resolves the request through the dispatch
//! queue, and posts a `Delivery` on a single-consumer channel. Handlers read
//! that channel from one task, so they observe deliveries one at a time in
//! arrival order.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use relayq_core::protocol::{decode_response_frame, ResponseStatus};
use relayq_core::{CorrelationId, RequestEnvelope};

use crate::dispatch::DispatchQueue;
use crate::obs::ClientMetrics;

/// One routed response.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub correlation_id: CorrelationId,
    pub status: ResponseStatus,
    pub payload: Bytes,
    /// The request this answers, or `None` when the id was no longer in flight
    /// (late, duplicate, or cancelled).
    pub request: Option<Arc<RequestEnvelope>>,
}

impl Delivery {
    pub fn is_matched(&self) -> bool {
        self.request.is_some()
    }
}

pub type DeliveryReceiver = mpsc::UnboundedReceiver<Delivery>;

struct RouterInner {
    queue: Arc<DispatchQueue>,
    deliveries: mpsc::UnboundedSender<Delivery>,
    metrics: Arc<ClientMetrics>,
}

impl RouterInner {
    fn route(&self, frame: Bytes) {
        match decode_response_frame(frame) {
            Ok(frame) => {
                let status = frame.status();
                self.route_parts(frame.correlation_id, status, frame.payload);
            }
            Err(e) => {
                self.metrics
                    .malformed_frames
                    .inc(&[("code", e.code().as_str())]);
                tracing::debug!(error = %e, "dropping malformed response frame");
            }
        }
    }

    fn route_parts(&self, correlation_id: CorrelationId, status: ResponseStatus, payload: Bytes) {
        let request = self.queue.remove(&correlation_id);
        let outcome = if request.is_some() { "matched" } else { "unmatched" };
        self.metrics
            .responses
            .inc(&[("outcome", outcome), ("status", status.as_str())]);
        if request.is_none() {
            tracing::debug!(%correlation_id, "response for an id that is no longer in flight");
        }

        let delivery = Delivery {
            correlation_id,
            status,
            payload,
            request,
        };
        if let Err(e) = self.deliveries.send(delivery) {
            tracing::debug!(correlation_id = %e.0.correlation_id, "delivery receiver dropped");
        }
    }
}

pub struct ResponseRouter {
    inner: Arc<RouterInner>,
    responder: OnceLock<Responder>,
}

impl ResponseRouter {
    pub fn new(queue: Arc<DispatchQueue>, metrics: Arc<ClientMetrics>) -> (Self, DeliveryReceiver) {
        let (deliveries, rx) = mpsc::unbounded_channel();
        let router = Self {
            inner: Arc::new(RouterInner {
                queue,
                deliveries,
                metrics,
            }),
            responder: OnceLock::new(),
        };
        (router, rx)
    }

    /// Reply-to handle for transports. Created on first use, then shared.
    pub fn responder(&self) -> Responder {
        self.responder
            .get_or_init(|| Responder {
                inner: Arc::clone(&self.inner),
            })
            .clone()
    }

    /// Route a raw response frame. Malformed frames are dropped.
    pub fn route(&self, frame: Bytes) {
        self.inner.route(frame);
    }

    /// Route a response whose id the transport already extracted.
    pub fn route_parts(&self, correlation_id: CorrelationId, status: ResponseStatus, payload: Bytes) {
        self.inner.route_parts(correlation_id, status, payload);
    }
}

/// Cloneable, thread-safe entry point for inbound responses.
#[derive(Clone)]
pub struct Responder {
    inner: Arc<RouterInner>,
}

impl Responder {
    pub fn deliver(&self, frame: Bytes) {
        self.inner.route(frame);
    }

    pub fn deliver_parts(&self, correlation_id: CorrelationId, status: ResponseStatus, payload: Bytes) {
        self.inner.route_parts(correlation_id, status, payload);
    }
}

/// Consumer of routed responses.
#[async_trait]
pub trait ResponseHandler: Send + Sync {
    async fn handle(&self, delivery: Delivery);
}

/// Drain `rx`, invoking `handler` for one delivery at a time.
///
/// Returns once every router and responder feeding `rx` is dropped.
pub async fn run_deliveries(mut rx: DeliveryReceiver, handler: Arc<dyn ResponseHandler>) {
    while let Some(delivery) = rx.recv().await {
        handler.handle(delivery).await;
    }
    tracing::debug!("delivery channel closed");
}
