//! Compact HS256 tokens (`header.claims.signature`).
//!
//! Each segment is URL-safe base64 without padding; trailing `=` is tolerated
//! on input. The signature is the SHA256 HMAC of `header.claims` exactly as
//! received. Only the `alg` header field is read before the signature is
//! checked; claims are decoded strictly after verification.

use data_encoding::BASE64URL_NOPAD;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// The only accepted signing algorithm.
pub const TOKEN_ALGORITHM: &str = "HS256";

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// Registered claims plus the role fields issued by the token authority.
///
/// Timestamps are unix seconds. Unknown claims are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl TokenClaims {
    /// Check `exp`, `nbf` and `iat` against `now`, allowing `leeway` seconds of skew.
    pub fn validate_at(&self, now: i64, leeway: i64) -> Result<(), AuthError> {
        if let Some(exp) = self.exp {
            if now > exp.saturating_add(leeway) {
                return Err(AuthError::Expired);
            }
        }
        if let Some(nbf) = self.nbf {
            if now.saturating_add(leeway) < nbf {
                return Err(AuthError::NotYetValid);
            }
        }
        if let Some(iat) = self.iat {
            if now.saturating_add(leeway) < iat {
                return Err(AuthError::IssuedInFuture);
            }
        }
        Ok(())
    }
}

fn mac(secret: &[u8]) -> Result<HmacSha256, AuthError> {
    HmacSha256::new_from_slice(secret).map_err(|_| AuthError::InvalidKey)
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, AuthError> {
    BASE64URL_NOPAD
        .decode(segment.trim_end_matches('=').as_bytes())
        .map_err(|_| AuthError::Malformed("segment is not base64url"))
}

/// Sign `claims` with `secret`, producing a compact HS256 token.
pub fn sign(claims: &TokenClaims, secret: &[u8]) -> Result<String, AuthError> {
    let header = TokenHeader {
        alg: TOKEN_ALGORITHM.to_owned(),
        typ: Some("JWT".to_owned()),
    };
    let header = serde_json::to_vec(&header).map_err(|_| AuthError::Malformed("header"))?;
    let claims = serde_json::to_vec(claims).map_err(|_| AuthError::Malformed("claims"))?;

    let signing_input = format!(
        "{}.{}",
        BASE64URL_NOPAD.encode(&header),
        BASE64URL_NOPAD.encode(&claims)
    );

    let mut mac = mac(secret)?;
    mac.update(signing_input.as_bytes());
    let signature = BASE64URL_NOPAD.encode(&mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{signature}"))
}

/// Verify the signature of `token` and return its claims.
///
/// Time validity is *not* checked here; see [`TokenClaims::validate_at`].
pub fn verify(token: &str, secret: &[u8]) -> Result<TokenClaims, AuthError> {
    let mut segments = token.split('.');
    let (Some(header), Some(claims), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::Malformed("expected three dot-separated segments"));
    };

    let parsed: TokenHeader = serde_json::from_slice(&decode_segment(header)?)
        .map_err(|_| AuthError::Malformed("header is not a JSON object"))?;
    if parsed.alg != TOKEN_ALGORITHM {
        return Err(AuthError::UnsupportedAlgorithm(parsed.alg));
    }

    let code = decode_segment(signature)?;
    let mut mac = mac(secret)?;
    mac.update(header.as_bytes());
    mac.update(b".");
    mac.update(claims.as_bytes());
    mac.verify_slice(&code).map_err(|_| AuthError::BadSignature)?;

    serde_json::from_slice(&decode_segment(claims)?)
        .map_err(|_| AuthError::Malformed("claims are not a JSON object"))
}
