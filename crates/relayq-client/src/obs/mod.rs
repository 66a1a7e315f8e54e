//! Lightweight in-process metrics (dependency-free).
//!
//! Counters are stored as atomics keyed by label sets and rendered in the
//! Prometheus text format on demand.

pub mod metrics;

pub use metrics::{ClientMetrics, CounterVec};
