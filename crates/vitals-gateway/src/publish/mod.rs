//! Snapshot export: periodic `snapshot -> encode -> sink.publish`.

pub mod publisher;
pub mod sink;

pub use crate::config::schema::FailurePolicy;
pub use publisher::{PublisherExit, SnapshotPublisher};
pub use sink::{FileSink, SnapshotSink, StdoutSink};
