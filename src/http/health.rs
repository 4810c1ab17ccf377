//! Liveness and readiness probes.

use axum::extract::State;
use axum::http::StatusCode;

use crate::lifecycle::Shutdown;

/// `GET /health`: the process is up.
pub async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// `GET /ready`: `503` once shutdown has begun.
pub async fn ready(State(shutdown): State<Shutdown>) -> StatusCode {
    if shutdown.is_draining() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::NO_CONTENT
    }
}
