//! Ingest path: `POST /update/` -> gate -> decode -> store.

pub mod handler;
pub mod processor;

pub use handler::ApiError;
pub use processor::IngestProcessor;
