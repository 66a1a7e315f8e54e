//! Shared fixtures: a channel that records every send attempt.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use relayq_client::config::QueueSection;
use relayq_client::dispatch::DispatchQueue;
use relayq_client::obs::ClientMetrics;
use relayq_client::pressure::PressureEvent;
use relayq_client::transport::Channel;
use relayq_core::error::{RelayError, Result};
use relayq_core::protocol::WorkerMessage;
use relayq_core::CorrelationId;

#[derive(Default)]
pub struct RecordingChannel {
    attempts: Mutex<Vec<WorkerMessage>>,
    fail: AtomicBool,
}

impl RecordingChannel {
    pub fn failing() -> Self {
        let ch = Self::default();
        ch.set_failing(true);
        ch
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn performs(&self) -> Vec<CorrelationId> {
        self.attempts
            .lock()
            .iter()
            .filter_map(|m| match m {
                WorkerMessage::Perform(env) => Some(env.correlation_id().clone()),
                WorkerMessage::Cancel(_) => None,
            })
            .collect()
    }

    pub fn cancels(&self) -> Vec<CorrelationId> {
        self.attempts
            .lock()
            .iter()
            .filter_map(|m| match m {
                WorkerMessage::Cancel(id) => Some(id.clone()),
                WorkerMessage::Perform(_) => None,
            })
            .collect()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().len()
    }
}

impl Channel for RecordingChannel {
    fn send(&self, msg: WorkerMessage) -> Result<()> {
        self.attempts.lock().push(msg);
        if self.fail.load(Ordering::SeqCst) {
            return Err(RelayError::TransportSend("recording channel set to fail".into()));
        }
        Ok(())
    }
}

pub struct Fixture {
    pub queue: Arc<DispatchQueue>,
    pub events: mpsc::UnboundedReceiver<PressureEvent>,
    pub metrics: Arc<ClientMetrics>,
}

impl Fixture {
    pub fn new(threshold: usize) -> Self {
        Self::with_section(QueueSection {
            pending_warning_threshold: threshold,
            resend_in_flight_on_reconnect: false,
        })
    }

    pub fn with_section(section: QueueSection) -> Self {
        let (tx, events) = mpsc::unbounded_channel::<PressureEvent>();
        let metrics = Arc::new(ClientMetrics::default());
        let queue = Arc::new(DispatchQueue::new(&section, Arc::new(tx), Arc::clone(&metrics)));
        Self {
            queue,
            events,
            metrics,
        }
    }

    /// Pressure events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<PressureEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = self.events.try_recv() {
            out.push(ev);
        }
        out
    }
}
