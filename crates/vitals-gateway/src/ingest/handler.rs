//! HTTP adapter for the ingest processor.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use vitals_core::error::VitalsError;

use crate::app_state::AppState;

/// `VitalsError` rendered as an HTTP response.
///
/// Body: `{"error": <stable code>, "message": <human-readable reason>}`.
#[derive(Debug)]
pub struct ApiError(pub VitalsError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            VitalsError::BadRequest(_) => StatusCode::BAD_REQUEST,
            VitalsError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            VitalsError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            VitalsError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            VitalsError::Config(_)
            | VitalsError::UnsupportedVersion
            | VitalsError::Encode(_)
            | VitalsError::Sink { .. }
            | VitalsError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<VitalsError> for ApiError {
    fn from(e: VitalsError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if self.0.is_client_error() {
            self.0.to_string()
        } else {
            "internal error".to_string()
        };
        let body = Json(json!({
            "error": self.0.client_code().as_str(),
            "message": message,
        }));

        let mut resp = (status, body).into_response();
        match status {
            StatusCode::METHOD_NOT_ALLOWED => {
                resp.headers_mut()
                    .insert(header::ALLOW, HeaderValue::from_static("POST"));
            }
            StatusCode::UNAUTHORIZED => {
                resp.headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            }
            _ => {}
        }
        resp
    }
}

/// `/update/` (any method; non-POST is rejected by the processor).
pub async fn update(
    State(app): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    let started = Instant::now();
    let credential = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let result = match body {
        Ok(body) => app.processor().ingest(&method, credential, &body),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(VitalsError::PayloadTooLarge)
        }
        Err(rejection) => Err(VitalsError::BadRequest(rejection.body_text())),
    };

    let metrics = app.metrics();
    metrics.ingest_duration.observe(&[], started.elapsed());

    let resp = match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            match &e {
                VitalsError::Unauthorized(reason) => {
                    metrics.auth_rejections.inc(&[("reason", reason.reason())]);
                    tracing::info!(reason = reason.reason(), "ingest rejected by gate");
                }
                other => tracing::debug!(error = %other, %method, "ingest rejected"),
            }
            ApiError(e).into_response()
        }
    };

    metrics
        .ingest_requests
        .inc(&[("status", resp.status().as_str())]);
    resp
}
