//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every inbound request
//! - Build the per-request tracing span
//! - Extract the `InboundRequest` the forwarder works on
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The request ID stays between caller and proxy; it is not sent upstream
//! - Body size limits come from `DefaultBodyLimit`, applied by the `Bytes` extractor

use axum::body::{Body, Bytes};
use axum::extract::{FromRequest, Request};
use axum::http::{HeaderValue, Request as HttpRequest};
use axum::response::{IntoResponse, Response};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

use crate::forward::target::parse_query;
use crate::forward::InboundRequest;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID generator producing UUID v4 values.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &HttpRequest<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Span for one inbound request, tagged with its request ID.
pub fn make_request_span(request: &HttpRequest<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

impl<S> FromRequest<S> for InboundRequest
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let query = parse_query(req.uri().query());
        let headers = req.headers().clone();

        // Rejects with 413 past the router's `DefaultBodyLimit`.
        let body = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        Ok(InboundRequest {
            method,
            path,
            query,
            headers,
            body: (!body.is_empty()).then_some(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Method};

    #[tokio::test]
    async fn test_extracts_inbound_request() {
        let req = HttpRequest::builder()
            .method(Method::PUT)
            .uri("/api/proxy/bills/7?a=1&a=2&note=hello%20world")
            .header(header::AUTHORIZATION, "Bearer t")
            .body(Body::from(r#"{"paid":true}"#))
            .unwrap();

        let inbound = InboundRequest::from_request(req, &()).await.unwrap();
        assert_eq!(inbound.method, Method::PUT);
        assert_eq!(inbound.path, "/api/proxy/bills/7");
        assert_eq!(
            inbound.query,
            vec![
                ("a".to_string(), "1".to_string()),
                ("a".to_string(), "2".to_string()),
                ("note".to_string(), "hello world".to_string()),
            ]
        );
        assert_eq!(inbound.headers[header::AUTHORIZATION], "Bearer t");
        assert_eq!(inbound.body.as_deref(), Some(&br#"{"paid":true}"#[..]));
    }

    #[tokio::test]
    async fn test_empty_body_is_absent() {
        let req = HttpRequest::builder()
            .method(Method::POST)
            .uri("/api/proxy/x")
            .body(Body::empty())
            .unwrap();

        let inbound = InboundRequest::from_request(req, &()).await.unwrap();
        assert!(inbound.body.is_none());
        assert!(inbound.query.is_empty());
    }

    #[test]
    fn test_request_ids_are_unique_uuids() {
        let mut maker = UuidRequestId;
        let req = HttpRequest::new(());
        let a = maker.make_request_id(&req).unwrap();
        let b = maker.make_request_id(&req).unwrap();

        let a = a.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(a).is_ok());
        assert_ne!(a, b.header_value().to_str().unwrap());
    }
}
