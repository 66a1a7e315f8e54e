//! Dispatch queue exports.
//!
//! Re-exports the queue and its snapshot type so downstream consumers can
//! depend on this module directly.

pub mod queue;

pub use queue::{DispatchQueue, QueueSnapshot};
