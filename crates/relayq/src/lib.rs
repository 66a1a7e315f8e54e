//! Top-level facade crate for relayq.
//!
//! Re-exports core types and the client runtime so users can depend on a single crate.

pub mod core {
    pub use relayq_core::*;
}

pub mod client {
    pub use relayq_client::*;
}
