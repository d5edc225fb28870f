//! Wire formats consumed by the gateway.
//!
//! Decoders are panic-free: malformed input is reported as `VitalsError`
//! instead of panicking, so one bad request never takes the process down.

pub mod sample;

pub use sample::MetricSample;
