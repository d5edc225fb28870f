use std::fmt;

use chrono::Utc;

use super::{token, AuthError, TokenClaims};

/// Stateless bearer-token gate in front of every store mutation.
#[derive(Clone)]
pub struct IngestGate {
    secret: Vec<u8>,
    leeway_secs: i64,
    required_role: Option<String>,
}

impl IngestGate {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            leeway_secs: 0,
            required_role: None,
        }
    }

    /// Allow `secs` of clock skew on `exp`, `nbf` and `iat`.
    pub fn with_leeway(mut self, secs: u64) -> Self {
        self.leeway_secs = i64::try_from(secs).unwrap_or(i64::MAX);
        self
    }

    /// Require the `role` claim to equal `role` (no check when `None`).
    pub fn with_required_role(mut self, role: Option<String>) -> Self {
        self.required_role = role;
        self
    }

    /// Authorize an `Authorization` header value against the current time.
    pub fn authorize(&self, header: Option<&str>) -> Result<TokenClaims, AuthError> {
        self.authorize_at(header, Utc::now().timestamp())
    }

    /// Authorize against an explicit unix time.
    pub fn authorize_at(&self, header: Option<&str>, now: i64) -> Result<TokenClaims, AuthError> {
        let header = header.ok_or(AuthError::MissingHeader)?;
        let raw = strip_bearer(header).ok_or(AuthError::MissingScheme)?;
        if raw.is_empty() {
            return Err(AuthError::Malformed("empty token"));
        }

        let claims = token::verify(raw, &self.secret)?;
        claims.validate_at(now, self.leeway_secs)?;

        if let Some(required) = &self.required_role {
            if claims.role.as_deref() != Some(required.as_str()) {
                return Err(AuthError::RoleNotPermitted);
            }
        }

        Ok(claims)
    }
}

impl fmt::Debug for IngestGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestGate")
            .field("secret", &"<redacted>")
            .field("leeway_secs", &self.leeway_secs)
            .field("required_role", &self.required_role)
            .finish()
    }
}

/// Strip a case-insensitive `Bearer ` scheme marker.
fn strip_bearer(header: &str) -> Option<&str> {
    let (scheme, rest) = header.trim_start().split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| rest.trim())
}
