#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Number};
use tokio::sync::watch;

use vitals_core::error::{Result, VitalsError};
use vitals_core::{BoundMode, MetricStore};
use vitals_gateway::config::FailurePolicy;
use vitals_gateway::obs::GatewayMetrics;
use vitals_gateway::publish::{FileSink, PublisherExit, SnapshotPublisher, SnapshotSink};

#[derive(Default)]
struct MemorySink {
    writes: Mutex<Vec<Bytes>>,
}

impl MemorySink {
    fn writes(&self) -> Vec<Bytes> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl SnapshotSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn publish(&self, payload: Bytes) -> Result<()> {
        self.writes.lock().unwrap().push(payload);
        Ok(())
    }
}

#[derive(Default)]
struct FailingSink {
    attempts: Mutex<u32>,
}

#[async_trait]
impl SnapshotSink for FailingSink {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn publish(&self, _payload: Bytes) -> Result<()> {
        *self.attempts.lock().unwrap() += 1;
        Err(VitalsError::Sink {
            sink: "failing",
            reason: "disk full".into(),
        })
    }
}

#[derive(Default)]
struct SlowSink {
    started: Mutex<u32>,
    finished: Mutex<u32>,
}

#[async_trait]
impl SnapshotSink for SlowSink {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn publish(&self, _payload: Bytes) -> Result<()> {
        *self.started.lock().unwrap() += 1;
        tokio::time::sleep(Duration::from_millis(200)).await;
        *self.finished.lock().unwrap() += 1;
        Ok(())
    }
}

fn temp_store() -> Arc<MetricStore> {
    let store = Arc::new(MetricStore::new(BoundMode::Overwrite));
    store.upsert(
        "temp",
        json!(75),
        Some(Number::from(10)),
        Some(Number::from(90)),
    );
    store
}

#[tokio::test]
async fn tick_exports_exact_snapshot() {
    let sink = Arc::new(MemorySink::default());
    let publisher = SnapshotPublisher::new(temp_store(), sink.clone());

    assert_eq!(publisher.tick().await.unwrap(), 1);

    let writes = sink.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(&writes[0][..], br#"{"temp":{"value":75,"min":10,"max":90}}"#);
}

#[tokio::test]
async fn empty_store_exports_empty_object() {
    let sink = Arc::new(MemorySink::default());
    let publisher = SnapshotPublisher::new(Arc::new(MetricStore::default()), sink.clone());

    assert_eq!(publisher.tick().await.unwrap(), 0);
    assert_eq!(&sink.writes()[0][..], b"{}");
}

#[tokio::test]
async fn each_tick_exports_the_current_state() {
    let store = temp_store();
    let sink = Arc::new(MemorySink::default());
    let publisher = SnapshotPublisher::new(store.clone(), sink.clone());

    publisher.tick().await.unwrap();
    store.upsert("hum", json!(0.4), None, None);
    publisher.tick().await.unwrap();

    let writes = sink.writes();
    assert_eq!(
        &writes[1][..],
        br#"{"hum":{"value":0.4,"min":0,"max":0},"temp":{"value":75,"min":10,"max":90}}"#
    );
}

#[tokio::test]
async fn run_publishes_periodically_until_shutdown() {
    let sink = Arc::new(MemorySink::default());
    let metrics = Arc::new(GatewayMetrics::default());
    let (tx, rx) = watch::channel(false);

    let handle = SnapshotPublisher::new(temp_store(), sink.clone())
        .with_interval(Duration::from_millis(20))
        .with_metrics(metrics.clone())
        .spawn(rx);

    tokio::time::sleep(Duration::from_millis(150)).await;
    tx.send(true).unwrap();

    let exit = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(exit, PublisherExit::Shutdown));

    let n = sink.writes().len();
    assert!(n >= 2, "expected several publishes, got {n}");
    assert_eq!(
        metrics.publishes.get(&[("sink", "memory"), ("outcome", "ok")]),
        n as u64
    );
    assert!(!metrics.is_publisher_halted());
}

#[tokio::test]
async fn shutdown_before_first_tick_publishes_nothing() {
    let sink = Arc::new(MemorySink::default());
    let (tx, rx) = watch::channel(false);

    let handle = SnapshotPublisher::new(temp_store(), sink.clone())
        .with_interval(Duration::from_secs(60))
        .spawn(rx);
    tx.send(true).unwrap();

    let exit = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(exit, PublisherExit::Shutdown));
    assert!(sink.writes().is_empty());
}

#[tokio::test]
async fn shutdown_waits_for_publish_in_flight() {
    let sink = Arc::new(SlowSink::default());
    let (tx, rx) = watch::channel(false);

    let handle = SnapshotPublisher::new(temp_store(), sink.clone())
        .with_interval(Duration::from_millis(20))
        .spawn(rx);

    // First tick fires at 20ms and the publish runs until ~220ms.
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(*sink.started.lock().unwrap(), 1);
    assert_eq!(*sink.finished.lock().unwrap(), 0);
    tx.send(true).unwrap();

    let exit = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(exit, PublisherExit::Shutdown));
    assert_eq!(*sink.started.lock().unwrap(), 1);
    assert_eq!(*sink.finished.lock().unwrap(), 1);
}

#[tokio::test]
async fn dropped_shutdown_sender_stops_the_loop() {
    let (tx, rx) = watch::channel(false);
    let handle = SnapshotPublisher::new(temp_store(), Arc::new(MemorySink::default()))
        .with_interval(Duration::from_secs(60))
        .spawn(rx);
    drop(tx);

    let exit = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(exit, PublisherExit::Shutdown));
}

#[tokio::test]
async fn failure_halts_under_stop_policy() {
    let sink = Arc::new(FailingSink::default());
    let metrics = Arc::new(GatewayMetrics::default());
    let (_tx, rx) = watch::channel(false);

    let handle = SnapshotPublisher::new(temp_store(), sink.clone())
        .with_interval(Duration::from_millis(10))
        .with_failure_policy(FailurePolicy::Stop)
        .with_metrics(metrics.clone())
        .spawn(rx);

    let exit = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .unwrap()
        .unwrap();
    match exit {
        PublisherExit::Halted(VitalsError::Sink { sink, reason }) => {
            assert_eq!(sink, "failing");
            assert_eq!(reason, "disk full");
        }
        other => panic!("unexpected exit: {other:?}"),
    }
    assert_eq!(*sink.attempts.lock().unwrap(), 1);
    assert!(metrics.is_publisher_halted());
    assert_eq!(
        metrics.publishes.get(&[("sink", "failing"), ("outcome", "error")]),
        1
    );
}

#[tokio::test]
async fn failure_is_retried_under_continue_policy() {
    let sink = Arc::new(FailingSink::default());
    let metrics = Arc::new(GatewayMetrics::default());
    let (tx, rx) = watch::channel(false);

    let handle = SnapshotPublisher::new(temp_store(), sink.clone())
        .with_interval(Duration::from_millis(10))
        .with_failure_policy(FailurePolicy::Continue)
        .with_metrics(metrics.clone())
        .spawn(rx);

    tokio::time::sleep(Duration::from_millis(100)).await;
    tx.send(true).unwrap();

    let exit = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(exit, PublisherExit::Shutdown));
    assert!(*sink.attempts.lock().unwrap() >= 2);
    assert!(!metrics.is_publisher_halted());
}

#[tokio::test]
async fn file_sink_replaces_previous_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    let store = temp_store();
    let sink = Arc::new(FileSink::open(&path).unwrap());
    let publisher = SnapshotPublisher::new(store.clone(), sink.clone());

    publisher.tick().await.unwrap();
    assert_eq!(
        std::fs::read(&path).unwrap(),
        br#"{"temp":{"value":75,"min":10,"max":90}}"#
    );

    store.upsert("temp", json!(80), None, None);
    publisher.tick().await.unwrap();
    assert_eq!(
        std::fs::read(&path).unwrap(),
        br#"{"temp":{"value":80,"min":10,"max":90}}"#
    );

    let mut staging = path.clone().into_os_string();
    staging.push(".tmp");
    assert!(!std::path::Path::new(&staging).exists());
    assert_eq!(sink.path(), path.as_path());
}

#[test]
fn file_sink_requires_existing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("snapshot.json");

    let err = FileSink::open(path).unwrap_err();
    assert!(matches!(err, VitalsError::Config(_)));
}
