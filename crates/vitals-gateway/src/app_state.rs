//! Shared application state for the vitals gateway.
//!
//! The store is built here once and handed to both consumers: the ingest
//! processor (through this state) and the snapshot publisher (via `store()`).

use std::sync::Arc;

use vitals_core::auth::IngestGate;
use vitals_core::error::Result;
use vitals_core::MetricStore;

use crate::config::GatewayConfig;
use crate::ingest::IngestProcessor;
use crate::obs::GatewayMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    metrics: Arc<GatewayMetrics>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    processor: IngestProcessor,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let gate = IngestGate::new(cfg.auth.secret_bytes()?)
            .with_leeway(cfg.auth.leeway_secs)
            .with_required_role(cfg.auth.required_role.clone());

        let store = Arc::new(MetricStore::new(cfg.store.bounds));
        let processor = IngestProcessor::new(store, gate);

        tracing::info!(
            bounds = ?cfg.store.bounds,
            leeway_secs = cfg.auth.leeway_secs,
            required_role = cfg.auth.required_role.as_deref().unwrap_or("-"),
            "ingest state ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, processor }),
            metrics: Arc::new(GatewayMetrics::default()),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn processor(&self) -> &IngestProcessor {
        &self.inner.processor
    }

    pub fn store(&self) -> Arc<MetricStore> {
        Arc::clone(self.inner.processor.store())
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn set_draining(&self) {
        self.metrics.set_draining();
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    /// Gauges computed on demand for `/metrics`.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        let tracked = u64::try_from(self.inner.processor.store().len()).unwrap_or(u64::MAX);
        vec![("vitals_metrics_tracked", tracked)]
    }
}
