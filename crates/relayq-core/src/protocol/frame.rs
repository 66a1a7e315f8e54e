//! Response frame parsing (panic-free).
//!
//! Layout: `[v:u8][flags:u8][id_len:u8][id: id_len bytes, UTF-8][payload...]`
//!
//! Parsing rules:
//! - Never index (`buf[0]`) — always use `Buf` and `remaining()` checks.
//! - Never `unwrap()` / `expect()` / `panic!()` in production paths.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::envelope::CorrelationId;
use crate::error::{RelayError, Result};

/// Only supported frame version.
pub const FRAME_VERSION: u8 = 1;

/// Flag: the worker reports the action failed; payload describes the failure.
pub const FRAME_FLAG_ERROR: u8 = 0x01;

/// Outcome reported by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Completed,
    Failed,
}

impl ResponseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseStatus::Completed => "completed",
            ResponseStatus::Failed => "failed",
        }
    }
}

/// Parsed response frame.
#[derive(Debug, Clone)]
pub struct ResponseFrame {
    /// Protocol version.
    pub v: u8,
    /// Feature flags (u8).
    pub flags: u8,
    /// Id of the request this frame answers.
    pub correlation_id: CorrelationId,
    /// Opaque payload (zero-copy).
    pub payload: Bytes,
}

impl ResponseFrame {
    pub fn status(&self) -> ResponseStatus {
        if self.flags & FRAME_FLAG_ERROR != 0 {
            ResponseStatus::Failed
        } else {
            ResponseStatus::Completed
        }
    }
}

/// Decode a response frame from bytes.
pub fn decode_response_frame(mut buf: Bytes) -> Result<ResponseFrame> {
    // Minimum header: v, flags, id_len
    if buf.remaining() < 3 {
        return Err(RelayError::MalformedResponse("response frame too short".into()));
    }

    let v = buf.get_u8();
    if v != FRAME_VERSION {
        return Err(RelayError::UnsupportedVersion);
    }

    let flags = buf.get_u8();
    let id_len = buf.get_u8() as usize;
    if id_len == 0 {
        return Err(RelayError::MalformedResponse("missing correlation id".into()));
    }
    if buf.remaining() < id_len {
        return Err(RelayError::MalformedResponse(format!(
            "correlation id truncated: need {id_len} bytes, have {}",
            buf.remaining()
        )));
    }

    let id_bytes = buf.split_to(id_len);
    let id = std::str::from_utf8(&id_bytes)
        .map_err(|e| RelayError::MalformedResponse(format!("correlation id not utf-8: {e}")))?;
    let correlation_id = CorrelationId::parse(id)?;

    // Remaining bytes are payload.
    Ok(ResponseFrame {
        v,
        flags,
        correlation_id,
        payload: buf,
    })
}

/// Encode a response frame (worker side).
pub fn encode_response_frame(
    correlation_id: &CorrelationId,
    status: ResponseStatus,
    payload: &[u8],
) -> Bytes {
    let id = correlation_id.as_str().as_bytes();
    let flags = match status {
        ResponseStatus::Completed => 0,
        ResponseStatus::Failed => FRAME_FLAG_ERROR,
    };

    let mut out = BytesMut::with_capacity(3 + id.len() + payload.len());
    out.put_u8(FRAME_VERSION);
    out.put_u8(flags);
    // CorrelationId guarantees len <= u8::MAX.
    out.put_u8(id.len() as u8);
    out.put_slice(id);
    out.put_slice(payload);
    out.freeze()
}
