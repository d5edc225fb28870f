use std::fmt;

use data_encoding::BASE64;
use serde::Deserialize;
use vitals_core::error::{Result, VitalsError};
use vitals_core::BoundMode;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    pub auth: AuthSection,

    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub publisher: PublisherSection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(VitalsError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.auth.validate()?;
        self.publisher.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !(64..=16 * 1024 * 1024).contains(&self.max_body_bytes) {
            return Err(VitalsError::Config(
                "gateway.max_body_bytes must be between 64 and 16777216".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8001".into()
}
fn default_max_body_bytes() -> usize {
    64 * 1024
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretEncoding {
    #[default]
    Raw,
    Base64,
}

#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSection {
    pub secret: String,

    #[serde(default)]
    pub secret_encoding: SecretEncoding,

    #[serde(default)]
    pub leeway_secs: u64,

    #[serde(default)]
    pub required_role: Option<String>,
}

impl AuthSection {
    pub fn validate(&self) -> Result<()> {
        if self.leeway_secs > 300 {
            return Err(VitalsError::Config(
                "auth.leeway_secs must be at most 300".into(),
            ));
        }
        if matches!(&self.required_role, Some(r) if r.is_empty()) {
            return Err(VitalsError::Config(
                "auth.required_role must not be empty".into(),
            ));
        }
        self.secret_bytes().map(|_| ())
    }

    /// Decoded HMAC key.
    pub fn secret_bytes(&self) -> Result<Vec<u8>> {
        let key = match self.secret_encoding {
            SecretEncoding::Raw => self.secret.as_bytes().to_vec(),
            SecretEncoding::Base64 => BASE64
                .decode(self.secret.trim().as_bytes())
                .map_err(|e| VitalsError::Config(format!("auth.secret is not base64: {e}")))?,
        };
        if key.is_empty() {
            return Err(VitalsError::Config("auth.secret must not be empty".into()));
        }
        Ok(key)
    }
}

impl fmt::Debug for AuthSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSection")
            .field("secret", &"<redacted>")
            .field("secret_encoding", &self.secret_encoding)
            .field("leeway_secs", &self.leeway_secs)
            .field("required_role", &self.required_role)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    #[serde(default)]
    pub bounds: BoundMode,
}

/// What the publisher does after a failed publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log and terminate the publish loop.
    #[default]
    Stop,
    /// Log and try again on the next tick.
    Continue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublisherSection {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default)]
    pub on_failure: FailurePolicy,

    #[serde(default)]
    pub sink: SinkSection,
}

impl Default for PublisherSection {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            on_failure: FailurePolicy::default(),
            sink: SinkSection::default(),
        }
    }
}

impl PublisherSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=3_600_000).contains(&self.interval_ms) {
            return Err(VitalsError::Config(
                "publisher.interval_ms must be between 100 and 3600000".into(),
            ));
        }
        self.sink.validate()
    }
}

fn default_interval_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    #[default]
    Stdout,
    File,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SinkSection {
    #[serde(default)]
    pub kind: SinkKind,

    #[serde(default)]
    pub path: Option<String>,
}

impl SinkSection {
    pub fn validate(&self) -> Result<()> {
        match (self.kind, self.path.as_deref()) {
            (SinkKind::File, None | Some("")) => Err(VitalsError::Config(
                "publisher.sink.path is required for kind=file".into(),
            )),
            (SinkKind::Stdout, Some(_)) => Err(VitalsError::Config(
                "publisher.sink.path is only valid for kind=file".into(),
            )),
            _ => Ok(()),
        }
    }
}
