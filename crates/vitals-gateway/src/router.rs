//! Axum router wiring.
//!
//! - `/update/` (and `/update`) : sample ingest (POST only; other methods get 405)
//! - `/healthz`, `/readyz`, `/metrics` : ops endpoints

use axum::{
    extract::DefaultBodyLimit,
    routing::{any, get},
    Router,
};

use crate::{app_state::AppState, ingest, ops};

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.cfg().gateway.max_body_bytes;

    Router::new()
        .route("/update/", any(ingest::handler::update))
        .route("/update", any(ingest::handler::update))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
