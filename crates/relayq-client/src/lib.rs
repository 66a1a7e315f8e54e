//! relayq client library entry.
//!
//! This crate wires the dispatch queue, pressure monitor, response router,
//! and transport seam into a client for one logical worker endpoint. It is
//! consumed by the demo binary (`main.rs`) and by integration tests.

pub mod client;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod obs;
pub mod pressure;
pub mod router;
pub mod transport;

pub use client::RelayClient;
