//! Request envelope and correlation ids.
//!
//! An envelope is built exactly once per submission and never mutated; the
//! correlation id it carries is the only key the client and the worker share.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;

use crate::error::{RelayError, Result};

/// Longest id that still fits the one-byte length prefix of a response frame.
pub const MAX_CORRELATION_ID_LEN: usize = u8::MAX as usize;

/// Opaque token matching a response back to its request.
///
/// Hashes and compares like the underlying `str`, so maps keyed by
/// `CorrelationId` can be queried with a plain `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationId(Arc<str>);

impl CorrelationId {
    /// Random `u64` followed by wall-clock millis, both lowercase hex.
    ///
    /// Not a security boundary. The timestamp suffix keeps ids distinct across
    /// rapid issuance even if the random part ever repeats.
    pub fn generate() -> Self {
        let random: u64 = rand::random();
        Self(format!("{random:x}{:x}", now_ms()).into())
    }

    /// Accept an id received from the wire.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(RelayError::MalformedResponse("empty correlation id".into()));
        }
        if s.len() > MAX_CORRELATION_ID_LEN {
            return Err(RelayError::MalformedResponse(format!(
                "correlation id too long ({} bytes)",
                s.len()
            )));
        }
        Ok(Self(Arc::from(s)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CorrelationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable record of one submitted request.
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    correlation_id: CorrelationId,
    payload: Bytes,
    submitted_at_ms: u64,
}

impl RequestEnvelope {
    /// Wrap `payload` with a fresh correlation id and the current time.
    pub fn new(payload: Bytes) -> Self {
        Self {
            correlation_id: CorrelationId::generate(),
            payload,
            submitted_at_ms: now_ms(),
        }
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// Opaque caller payload (zero-copy clone).
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Wall-clock submission time in milliseconds since the Unix epoch.
    pub fn submitted_at_ms(&self) -> u64 {
        self.submitted_at_ms
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
