//! Response handling and transformation.
//!
//! # Responsibilities
//! - Encode relayed responses as JSON with the upstream status
//!
//! # Design Decisions
//! - Upstream bodies are fully buffered; no streaming to the caller
//! - Only the status and body are relayed, upstream headers are not copied

use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::forward::RelayedResponse;

impl IntoResponse for RelayedResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
