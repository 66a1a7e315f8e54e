//! Wire contracts between the client and a worker.
//!
//! - Outbound: `WorkerMessage` values handed to a channel (perform / cancel).
//! - Inbound: binary response frames carrying the correlation id in a short
//!   fixed header followed by an opaque payload.
//!
//! Frame parsing is panic-free: truncated or corrupt headers are reported as
//! `RelayError` so the receiving side can drop them without tearing down.

pub mod frame;
pub mod message;

pub use frame::{decode_response_frame, encode_response_frame, ResponseFrame, ResponseStatus};
pub use message::WorkerMessage;
