//! Per-request types flowing through the forwarder.
//!
//! None of these outlive a single request.

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};

use crate::forward::error::ForwardError;

/// The caller's request, as seen by the forwarder.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    /// Raw (still percent-encoded) request path, prefix included.
    pub path: String,
    /// Decoded query pairs in arrival order. Keys may repeat.
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    /// `None` when the caller sent no body bytes.
    pub body: Option<Bytes>,
}

/// The request issued to the upstream.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    /// Only `Authorization` and `Content-Type`.
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// The upstream's answer, fully buffered.
#[derive(Debug, Clone)]
pub struct OutboundResponse {
    pub status: StatusCode,
    pub body: String,
}

/// A relayed payload: parsed JSON when the upstream sent JSON, the raw text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    Raw(String),
}

impl ResponseBody {
    /// Best-effort parse of an upstream body.
    pub fn from_text(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Raw(text),
        }
    }
}

/// What the caller receives.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayedResponse {
    pub status: StatusCode,
    pub body: ResponseBody,
}

impl RelayedResponse {
    /// Relay an upstream response, keeping its status untouched.
    pub fn from_upstream(response: OutboundResponse) -> Self {
        Self {
            status: response.status,
            body: ResponseBody::from_text(response.body),
        }
    }

    /// The response sent when the proxy fails before an upstream response arrives.
    pub fn proxy_error(error: &ForwardError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ResponseBody::Json(json!({
                "error": "Proxy server error",
                "details": error.to_string(),
            })),
        }
    }
}
