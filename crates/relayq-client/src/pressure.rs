//! Outstanding-request pressure tracking.
//!
//! The monitor is edge-triggered: one event when the outstanding count first
//! reaches the threshold, one event when it drops back below. Re-evaluating at
//! a steady state is silent.

use tokio::sync::{mpsc, watch};

/// Direction of a threshold crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressureState {
    AboveThreshold,
    Recovered,
}

impl PressureState {
    pub fn as_str(self) -> &'static str {
        match self {
            PressureState::AboveThreshold => "above_threshold",
            PressureState::Recovered => "recovered",
        }
    }
}

/// Emitted once per threshold crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressureEvent {
    pub state: PressureState,
    /// Backlog + in-flight at the moment of the crossing.
    pub outstanding: usize,
}

#[derive(Debug, Clone)]
pub struct PressureMonitor {
    threshold: usize,
    warned: bool,
}

impl PressureMonitor {
    /// `threshold == 0` disables monitoring.
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            warned: false,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn is_warned(&self) -> bool {
        self.warned
    }

    pub fn evaluate(&mut self, size: usize) -> Option<PressureEvent> {
        if self.threshold == 0 {
            return None;
        }

        if size >= self.threshold && !self.warned {
            self.warned = true;
            return Some(PressureEvent {
                state: PressureState::AboveThreshold,
                outstanding: size,
            });
        }
        if size < self.threshold && self.warned {
            self.warned = false;
            return Some(PressureEvent {
                state: PressureState::Recovered,
                outstanding: size,
            });
        }
        None
    }

    /// Back to the below-threshold state (size 0).
    pub fn reset(&mut self) -> Option<PressureEvent> {
        self.evaluate(0)
    }
}

/// Receives pressure events.
///
/// Called while the dispatch queue lock is held, so implementations must not
/// block.
pub trait PressureSink: Send + Sync {
    fn notify(&self, event: PressureEvent);
}

/// Discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPressureSink;

impl PressureSink for NoopPressureSink {
    fn notify(&self, _event: PressureEvent) {}
}

impl PressureSink for mpsc::UnboundedSender<PressureEvent> {
    fn notify(&self, event: PressureEvent) {
        // receiver gone: nobody is listening anymore
        let _ = self.send(event);
    }
}

/// Sticky sink: observers read the latest crossing at any time.
impl PressureSink for watch::Sender<Option<PressureEvent>> {
    fn notify(&self, event: PressureEvent) {
        self.send_replace(Some(event));
    }
}
