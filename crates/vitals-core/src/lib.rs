//! vitals core: metric store, snapshot format, sample decoding and the ingest gate.
//!
//! This crate holds the state and contracts shared by the gateway and its
//! tests. It carries no transport or async runtime dependencies.
//!
//! # Panic policy
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths surface as `VitalsError`/`Result` so a malformed sample
//! or token can never crash the process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod auth;
pub mod error;
pub mod protocol;
pub mod snapshot;
pub mod store;

/// Shared result type.
pub use error::{Result, VitalsError};
pub use snapshot::Snapshot;
pub use store::{BoundMode, MetricRecord, MetricStore};
