//! Ingest authorization.
//!
//! Callers present `Authorization: Bearer <token>` where the token is a compact
//! HS256-signed JWS. Verification is stateless: every call re-checks the
//! signature and the time-validity window against the shared secret.

pub mod gate;
pub mod token;

use thiserror::Error;

pub use gate::IngestGate;
pub use token::{sign, verify, TokenClaims, TOKEN_ALGORITHM};

/// Reason a credential was rejected. Messages never include the token itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid or missing Authorization header")]
    MissingHeader,
    #[error("authorization scheme must be Bearer")]
    MissingScheme,
    #[error("malformed token: {0}")]
    Malformed(&'static str),
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("signature is invalid")]
    BadSignature,
    #[error("verification key rejected")]
    InvalidKey,
    #[error("token is expired")]
    Expired,
    #[error("token is not valid yet")]
    NotYetValid,
    #[error("token used before issued")]
    IssuedInFuture,
    #[error("token role is not permitted")]
    RoleNotPermitted,
}

impl AuthError {
    /// Short stable label, used for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "missing_header",
            AuthError::MissingScheme => "missing_scheme",
            AuthError::Malformed(_) => "malformed",
            AuthError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            AuthError::BadSignature => "bad_signature",
            AuthError::InvalidKey => "invalid_key",
            AuthError::Expired => "expired",
            AuthError::NotYetValid => "not_yet_valid",
            AuthError::IssuedInFuture => "issued_in_future",
            AuthError::RoleNotPermitted => "role_not_permitted",
        }
    }
}
