//! Liveness endpoint.
//!
//! `GET /health` answers from the proxy itself and never touches the upstream.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub message: &'static str,
}

pub async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        message: "Proxy server is running",
    })
}
