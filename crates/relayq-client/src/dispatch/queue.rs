use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;

use relayq_core::protocol::WorkerMessage;
use relayq_core::{CorrelationId, RequestEnvelope};

use crate::config::QueueSection;
use crate::connection::{Link, Placement, QueueState};
use crate::obs::ClientMetrics;
use crate::pressure::PressureSink;
use crate::transport::Channel;

/// Point-in-time view of the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub backlog: usize,
    pub in_flight: usize,
    pub connected: bool,
    pub warned: bool,
}

impl QueueSnapshot {
    pub fn outstanding(&self) -> usize {
        self.backlog + self.in_flight
    }
}

/// Accepts requests regardless of connection state and forwards them to the
/// worker once a channel exists.
///
/// One lock guards both maps, the link, and the pressure monitor. Every public
/// operation holds it for its whole critical section, so a `submit` racing
/// with `on_connected` lands in exactly one map and is sent at most once.
/// Channel sends happen under the lock and are non-blocking by contract.
pub struct DispatchQueue {
    state: Mutex<QueueState>,
    resend_in_flight_on_reconnect: bool,
    sink: Arc<dyn PressureSink>,
    metrics: Arc<ClientMetrics>,
}

impl DispatchQueue {
    pub fn new(cfg: &QueueSection, sink: Arc<dyn PressureSink>, metrics: Arc<ClientMetrics>) -> Self {
        Self {
            state: Mutex::new(QueueState::new(cfg.pending_warning_threshold)),
            resend_in_flight_on_reconnect: cfg.resend_in_flight_on_reconnect,
            sink,
            metrics,
        }
    }

    /// Record a request and forward it if connected. Returns immediately.
    pub fn submit(&self, payload: impl Into<Bytes>) -> CorrelationId {
        let env = Arc::new(RequestEnvelope::new(payload.into()));
        let id = env.correlation_id().clone();

        let mut st = self.state.lock();
        let channel = st.link.channel().cloned();
        match channel {
            Some(channel) => {
                st.in_flight.insert(id.clone(), Arc::clone(&env));
                self.evaluate_pressure(&mut st);
                self.metrics.requests_submitted.inc(&[("placement", "in_flight")]);
                self.forward(channel.as_ref(), WorkerMessage::Perform(env));
            }
            None => {
                st.backlog.insert(id.clone(), env);
                self.evaluate_pressure(&mut st);
                self.metrics.requests_submitted.inc(&[("placement", "backlog")]);
                tracing::trace!(correlation_id = %id, "queued until connected");
            }
        }
        id
    }

    /// Drop local bookkeeping for `id` and, if connected, tell the worker.
    ///
    /// Idempotent. The worker notice is advisory: the request may already be
    /// running or finished on the other side.
    pub fn cancel(&self, id: &CorrelationId) {
        let mut st = self.state.lock();
        let found = st.remove_any(id).is_some();
        self.metrics
            .cancels
            .inc(&[("found", if found { "true" } else { "false" })]);
        tracing::debug!(correlation_id = %id, found, "cancel requested");

        if let Some(channel) = st.link.channel().cloned() {
            self.forward(channel.as_ref(), WorkerMessage::Cancel(id.clone()));
        }
        self.evaluate_pressure(&mut st);
    }

    /// Local-only bulk clear for teardown. No worker notices are sent.
    pub fn cancel_all_unsubmitted(&self) {
        let mut st = self.state.lock();
        let dropped = st.clear();
        self.evaluate_pressure(&mut st);
        if dropped > 0 {
            tracing::info!(dropped, "discarded all outstanding requests");
        }
    }

    pub fn is_pending(&self, id: &CorrelationId) -> bool {
        self.state.lock().placement(id).is_some()
    }

    pub fn placement(&self, id: &CorrelationId) -> Option<Placement> {
        self.state.lock().placement(id)
    }

    /// Resolve an in-flight request. `None` for late, duplicate, or cancelled
    /// responses; backlog entries are never returned since they were never sent.
    pub fn remove(&self, id: &CorrelationId) -> Option<Arc<RequestEnvelope>> {
        let mut st = self.state.lock();
        let env = st.in_flight.remove(id);
        self.evaluate_pressure(&mut st);
        env
    }

    /// Install `channel` and forward the backlog through it.
    ///
    /// Each backlog entry moves to in-flight and gets exactly one send attempt.
    /// A failed send leaves the entry in flight; it is not retried.
    pub fn on_connected(&self, channel: Arc<dyn Channel>) {
        let mut st = self.state.lock();
        st.link = Link::Connected(Arc::clone(&channel));

        let resend: Vec<Arc<RequestEnvelope>> = if self.resend_in_flight_on_reconnect {
            st.in_flight.values().cloned().collect()
        } else {
            Vec::new()
        };
        let promoted = st.promote_backlog();
        tracing::info!(
            promoted = promoted.len(),
            resent = resend.len(),
            in_flight = st.in_flight.len(),
            "worker connected"
        );

        for env in resend.into_iter().chain(promoted) {
            self.forward(channel.as_ref(), WorkerMessage::Perform(env));
        }
    }

    /// Forget the channel. Both maps are left as they are.
    pub fn on_disconnected(&self) {
        let mut st = self.state.lock();
        st.link = Link::Disconnected;
        tracing::info!(
            backlog = st.backlog.len(),
            in_flight = st.in_flight.len(),
            "worker disconnected"
        );
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().link.is_connected()
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        let st = self.state.lock();
        QueueSnapshot {
            backlog: st.backlog.len(),
            in_flight: st.in_flight.len(),
            connected: st.link.is_connected(),
            warned: st.pressure.is_warned(),
        }
    }

    fn evaluate_pressure(&self, st: &mut QueueState) {
        let size = st.outstanding();
        if let Some(event) = st.pressure.evaluate(size) {
            tracing::info!(
                state = event.state.as_str(),
                outstanding = event.outstanding,
                threshold = st.pressure.threshold(),
                "queue pressure changed"
            );
            self.metrics
                .pressure_transitions
                .inc(&[("state", event.state.as_str())]);
            self.sink.notify(event);
        }
    }

    fn forward(&self, channel: &dyn Channel, msg: WorkerMessage) {
        let kind = msg.kind();
        let id = msg.correlation_id().clone();
        match channel.send(msg) {
            Ok(()) => {
                self.metrics
                    .worker_sends
                    .inc(&[("kind", kind), ("result", "ok")]);
            }
            Err(e) => {
                self.metrics
                    .worker_sends
                    .inc(&[("kind", kind), ("result", "error")]);
                tracing::warn!(correlation_id = %id, kind, error = %e, "unable to send message to worker");
            }
        }
    }
}
