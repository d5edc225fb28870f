use std::sync::Arc;

use axum::http::Method;

use vitals_core::auth::IngestGate;
use vitals_core::error::{Result, VitalsError};
use vitals_core::protocol::MetricSample;
use vitals_core::MetricStore;

/// Turns one inbound request into at most one store mutation.
///
/// Every check runs before the store is touched, so a rejected request never
/// changes state. There are no retries: a caller resubmits on failure.
#[derive(Debug)]
pub struct IngestProcessor {
    store: Arc<MetricStore>,
    gate: IngestGate,
}

impl IngestProcessor {
    pub fn new(store: Arc<MetricStore>, gate: IngestGate) -> Self {
        Self { store, gate }
    }

    pub fn store(&self) -> &Arc<MetricStore> {
        &self.store
    }

    pub fn ingest(&self, method: &Method, credential: Option<&str>, body: &[u8]) -> Result<()> {
        if method != Method::POST {
            return Err(VitalsError::MethodNotAllowed(method.to_string()));
        }
        if body.is_empty() {
            return Err(VitalsError::BadRequest("no data was sent".into()));
        }

        let claims = self.gate.authorize(credential)?;
        let sample = MetricSample::from_slice(body)?;

        self.store
            .upsert(&sample.name, sample.value, sample.min, sample.max);

        tracing::debug!(
            metric = %sample.name,
            user = claims.user_id.as_deref().unwrap_or("-"),
            "sample applied"
        );
        Ok(())
    }
}
