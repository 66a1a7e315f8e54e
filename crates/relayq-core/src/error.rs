//! Shared error type across relayq crates.

use thiserror::Error;

/// Stable error codes (safe to log or hand to embedding applications).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Forwarding an envelope or cancel notice failed.
    TransportSend,
    /// Referenced id is in neither the backlog nor the in-flight map.
    UnknownCorrelationId,
    /// Inbound frame lacks usable correlation metadata.
    MalformedResponse,
    /// Unsupported frame version.
    UnsupportedVersion,
    /// Invalid configuration.
    Config,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and test vectors.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::TransportSend => "TRANSPORT_SEND",
            ErrorCode::UnknownCorrelationId => "UNKNOWN_CORRELATION_ID",
            ErrorCode::MalformedResponse => "MALFORMED_RESPONSE",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Config => "CONFIG",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Unified error type used by core and client.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("transport send failed: {0}")]
    TransportSend(String),
    #[error("unknown correlation id: {0}")]
    UnknownCorrelationId(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("unsupported frame version")]
    UnsupportedVersion,
    #[error("invalid config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl RelayError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            RelayError::TransportSend(_) => ErrorCode::TransportSend,
            RelayError::UnknownCorrelationId(_) => ErrorCode::UnknownCorrelationId,
            RelayError::MalformedResponse(_) => ErrorCode::MalformedResponse,
            RelayError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            RelayError::Config(_) => ErrorCode::Config,
            RelayError::Internal(_) => ErrorCode::Internal,
        }
    }
}
