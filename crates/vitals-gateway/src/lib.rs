//! vitals gateway library entry.
//!
//! Wires the HTTP ingest endpoint, the snapshot publisher, config loading and
//! ops endpoints around the core metric store. Consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod ingest;
pub mod obs;
pub mod ops;
pub mod publish;
pub mod router;
