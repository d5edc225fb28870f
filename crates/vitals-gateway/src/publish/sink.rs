//! Snapshot sinks.
//!
//! A sink receives the whole encoded snapshot on every tick and must replace
//! whatever it stored before. Sinks are built once at startup and shared by
//! every tick.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;

use vitals_core::error::{Result, VitalsError};

use crate::config::{SinkKind, SinkSection};

/// Durable destination for published snapshots.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    fn name(&self) -> &'static str;
    async fn publish(&self, payload: Bytes) -> Result<()>;
}

/// Build the configured sink.
pub fn from_config(section: &SinkSection) -> Result<Arc<dyn SnapshotSink>> {
    match section.kind {
        SinkKind::Stdout => Ok(Arc::new(StdoutSink)),
        SinkKind::File => {
            let path = section
                .path
                .as_deref()
                .ok_or_else(|| VitalsError::Config("publisher.sink.path is required".into()))?;
            Ok(Arc::new(FileSink::open(path)?))
        }
    }
}

/// Writes each snapshot followed by a newline to stdout.
#[derive(Debug, Default)]
pub struct StdoutSink;

#[async_trait]
impl SnapshotSink for StdoutSink {
    fn name(&self) -> &'static str {
        "stdout"
    }

    async fn publish(&self, payload: Bytes) -> Result<()> {
        let fail = |e: std::io::Error| VitalsError::Sink {
            sink: "stdout",
            reason: e.to_string(),
        };
        let mut out = tokio::io::stdout();
        out.write_all(&payload).await.map_err(fail)?;
        out.write_all(b"\n").await.map_err(fail)?;
        out.flush().await.map_err(fail)
    }
}

/// Single-object file sink.
///
/// Each publish writes `<path>.tmp`, syncs it, then renames it over `<path>`,
/// so readers see either the previous snapshot or the new one, never a mix.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    staging: PathBuf,
}

impl FileSink {
    /// Check that the target directory exists, then build the sink.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.is_dir() {
            return Err(VitalsError::Config(format!(
                "publisher.sink.path directory does not exist: {}",
                dir.display()
            )));
        }

        let mut staging = path.clone().into_os_string();
        staging.push(".tmp");
        Ok(Self {
            path,
            staging: PathBuf::from(staging),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotSink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn publish(&self, payload: Bytes) -> Result<()> {
        let fail = |e: std::io::Error| VitalsError::Sink {
            sink: "file",
            reason: format!("{}: {e}", self.path.display()),
        };

        let mut file = tokio::fs::File::create(&self.staging).await.map_err(fail)?;
        file.write_all(&payload).await.map_err(fail)?;
        file.sync_all().await.map_err(fail)?;
        drop(file);

        tokio::fs::rename(&self.staging, &self.path).await.map_err(fail)
    }
}
