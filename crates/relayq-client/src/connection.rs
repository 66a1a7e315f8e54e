//! Connection state owned by the dispatch queue.
//!
//! Every not-yet-resolved envelope lives in exactly one of two maps: the
//! backlog (accepted while no channel exists) or in-flight (handed to a
//! channel, awaiting a response).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use relayq_core::{CorrelationId, RequestEnvelope};

use crate::pressure::PressureMonitor;
use crate::transport::Channel;

/// Live channel to the worker, if any.
#[derive(Clone, Default)]
pub enum Link {
    #[default]
    Disconnected,
    Connected(Arc<dyn Channel>),
}

impl Link {
    pub fn channel(&self) -> Option<&Arc<dyn Channel>> {
        match self {
            Link::Connected(ch) => Some(ch),
            Link::Disconnected => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Link::Connected(_))
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Link::Disconnected => f.write_str("Disconnected"),
            Link::Connected(_) => f.write_str("Connected(..)"),
        }
    }
}

/// Which map currently holds an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Backlog,
    InFlight,
}

type EnvelopeMap = HashMap<CorrelationId, Arc<RequestEnvelope>>;

/// Everything guarded by the dispatch queue lock.
#[derive(Debug)]
pub(crate) struct QueueState {
    pub(crate) link: Link,
    pub(crate) backlog: EnvelopeMap,
    pub(crate) in_flight: EnvelopeMap,
    pub(crate) pressure: PressureMonitor,
}

impl QueueState {
    pub(crate) fn new(pending_warning_threshold: usize) -> Self {
        Self {
            link: Link::Disconnected,
            backlog: HashMap::new(),
            in_flight: HashMap::new(),
            pressure: PressureMonitor::new(pending_warning_threshold),
        }
    }

    /// Backlog + in-flight.
    pub(crate) fn outstanding(&self) -> usize {
        self.backlog.len() + self.in_flight.len()
    }

    pub(crate) fn placement(&self, id: &CorrelationId) -> Option<Placement> {
        if self.in_flight.contains_key(id) {
            Some(Placement::InFlight)
        } else if self.backlog.contains_key(id) {
            Some(Placement::Backlog)
        } else {
            None
        }
    }

    /// Remove from whichever map holds `id`.
    pub(crate) fn remove_any(&mut self, id: &CorrelationId) -> Option<Arc<RequestEnvelope>> {
        self.in_flight
            .remove(id)
            .or_else(|| self.backlog.remove(id))
    }

    /// Move every backlog entry into in-flight and return the moved envelopes.
    pub(crate) fn promote_backlog(&mut self) -> Vec<Arc<RequestEnvelope>> {
        let moved: Vec<Arc<RequestEnvelope>> = self.backlog.drain().map(|(_, env)| env).collect();
        for env in &moved {
            self.in_flight
                .insert(env.correlation_id().clone(), Arc::clone(env));
        }
        moved
    }

    pub(crate) fn clear(&mut self) -> usize {
        let dropped = self.outstanding();
        self.backlog.clear();
        self.in_flight.clear();
        dropped
    }
}
