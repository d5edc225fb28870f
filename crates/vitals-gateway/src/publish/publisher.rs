use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use vitals_core::error::{Result, VitalsError};
use vitals_core::MetricStore;

use crate::config::{FailurePolicy, PublisherSection};
use crate::obs::GatewayMetrics;
use crate::publish::sink::SnapshotSink;

const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Why the publish loop returned.
#[derive(Debug)]
pub enum PublisherExit {
    /// The shutdown signal fired (or its sender was dropped).
    Shutdown,
    /// A publish failed under [`FailurePolicy::Stop`].
    Halted(VitalsError),
}

/// Background task that exports the store to a sink on a fixed period.
pub struct SnapshotPublisher {
    store: Arc<MetricStore>,
    sink: Arc<dyn SnapshotSink>,
    interval: Duration,
    on_failure: FailurePolicy,
    metrics: Arc<GatewayMetrics>,
}

impl SnapshotPublisher {
    pub fn new(store: Arc<MetricStore>, sink: Arc<dyn SnapshotSink>) -> Self {
        Self {
            store,
            sink,
            interval: DEFAULT_INTERVAL,
            on_failure: FailurePolicy::default(),
            metrics: Arc::new(GatewayMetrics::default()),
        }
    }

    pub fn from_config(
        store: Arc<MetricStore>,
        sink: Arc<dyn SnapshotSink>,
        section: &PublisherSection,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self::new(store, sink)
            .with_interval(Duration::from_millis(section.interval_ms))
            .with_failure_policy(section.on_failure)
            .with_metrics(metrics)
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<GatewayMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Take one snapshot and hand it to the sink. Returns the record count.
    pub async fn tick(&self) -> Result<usize> {
        let started = std::time::Instant::now();
        let sink = self.sink.name();

        let result = self.publish_once().await;

        self.metrics
            .publish_duration
            .observe(&[("sink", sink)], started.elapsed());
        let outcome = if result.is_ok() { "ok" } else { "error" };
        self.metrics
            .publishes
            .inc(&[("sink", sink), ("outcome", outcome)]);
        result
    }

    async fn publish_once(&self) -> Result<usize> {
        let snapshot = self.store.snapshot();
        let payload = snapshot.encode()?;
        let bytes = payload.len();

        self.sink.publish(payload).await?;

        let gauge = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
        self.metrics.snapshot_bytes.set(&[], gauge(bytes));
        self.metrics.snapshot_records.set(&[], gauge(snapshot.len()));
        debug!(records = snapshot.len(), bytes, sink = self.sink.name(), "snapshot published");
        Ok(snapshot.len())
    }

    /// Run until `shutdown` flips to `true` or, under `FailurePolicy::Stop`,
    /// until a publish fails. A publish already in flight always completes.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> PublisherExit {
        if *shutdown.borrow() {
            return PublisherExit::Shutdown;
        }

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            sink = self.sink.name(),
            interval_ms = self.interval.as_millis() as u64,
            on_failure = ?self.on_failure,
            "snapshot publisher started"
        );

        loop {
            tokio::select! {
                // Shutdown wins over a tick that came due during a slow publish.
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("snapshot publisher stopping");
                        return PublisherExit::Shutdown;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.tick().await {
                        match self.on_failure {
                            FailurePolicy::Stop => {
                                error!(error = %e, "snapshot publish failed, halting publisher");
                                self.metrics.set_publisher_halted();
                                return PublisherExit::Halted(e);
                            }
                            FailurePolicy::Continue => {
                                warn!(error = %e, "snapshot publish failed, retrying next tick");
                            }
                        }
                    }
                }
            }
        }
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<PublisherExit> {
        tokio::spawn(self.run(shutdown))
    }
}
