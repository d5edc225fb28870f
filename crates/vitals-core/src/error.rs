//! Shared error type across vitals crates.

use thiserror::Error;

use crate::auth::AuthError;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed sample.
    BadRequest,
    /// Credential missing or rejected by the ingest gate.
    Unauthorized,
    /// Request method is not accepted by the endpoint.
    MethodNotAllowed,
    /// Payload too large.
    PayloadTooLarge,
    /// Configuration rejected at startup.
    InvalidConfig,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::Unauthorized => "UNAUTHORIZED",
            ClientCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ClientCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ClientCode::InvalidConfig => "INVALID_CONFIG",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, VitalsError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum VitalsError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("authentication failure: {0}")]
    Unauthorized(#[from] AuthError),
    #[error("method {0} is not allowed")]
    MethodNotAllowed(String),
    #[error("payload too large")]
    PayloadTooLarge,
    #[error("invalid config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("snapshot encode failed: {0}")]
    Encode(String),
    #[error("sink {sink} rejected snapshot: {reason}")]
    Sink { sink: &'static str, reason: String },
    #[error("internal: {0}")]
    Internal(String),
}

impl VitalsError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            VitalsError::BadRequest(_) => ClientCode::BadRequest,
            VitalsError::Unauthorized(_) => ClientCode::Unauthorized,
            VitalsError::MethodNotAllowed(_) => ClientCode::MethodNotAllowed,
            VitalsError::PayloadTooLarge => ClientCode::PayloadTooLarge,
            VitalsError::Config(_) => ClientCode::InvalidConfig,
            VitalsError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            VitalsError::Encode(_) | VitalsError::Sink { .. } | VitalsError::Internal(_) => {
                ClientCode::Internal
            }
        }
    }

    /// True for errors caused by the caller's request (never by server state).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.client_code(),
            ClientCode::BadRequest
                | ClientCode::Unauthorized
                | ClientCode::MethodNotAllowed
                | ClientCode::PayloadTooLarge
        )
    }
}
