//! The request-forwarding contract.
//!
//! `forward` turns one inbound request into one outbound call and relays the
//! upstream's status and body back. Only `Authorization` and `Content-Type`
//! cross over; every other inbound header is dropped.

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method};

use crate::config::ProxyConfig;
use crate::forward::error::ForwardError;
use crate::forward::target;
use crate::forward::types::{InboundRequest, OutboundRequest, RelayedResponse};
use crate::forward::upstream::UpstreamClient;
use crate::observability::metrics;

const DEFAULT_CONTENT_TYPE: &str = "application/json";

#[derive(Debug)]
struct Settings {
    base_url: String,
    path_prefix: String,
    cancel_on_disconnect: bool,
    log_payloads: bool,
}

/// Forwards requests under a fixed prefix to a fixed upstream.
#[derive(Clone)]
pub struct Forwarder<C> {
    client: C,
    settings: Arc<Settings>,
}

impl<C: UpstreamClient> Forwarder<C> {
    pub fn new(config: &ProxyConfig, client: C) -> Self {
        Self {
            client,
            settings: Arc::new(Settings {
                base_url: config.upstream.base_url.clone(),
                path_prefix: config.upstream.path_prefix.clone(),
                cancel_on_disconnect: config.upstream.cancel_on_disconnect,
                log_payloads: config.observability.log_payloads,
            }),
        }
    }

    /// Forward `inbound` and produce the response for the caller.
    ///
    /// Failures before an upstream response arrives become a 500 with an
    /// `{"error", "details"}` body. Upstream statuses are never rewritten.
    pub async fn forward(&self, inbound: InboundRequest) -> RelayedResponse {
        let result = if self.settings.cancel_on_disconnect {
            self.try_forward(inbound).await
        } else {
            // Detached so a dropped caller does not cancel the upstream call.
            let this = self.clone();
            match tokio::spawn(async move { this.try_forward(inbound).await }).await {
                Ok(result) => result,
                Err(e) => Err(ForwardError::Aborted(e.to_string())),
            }
        };

        match result {
            Ok(relayed) => relayed,
            Err(e) => {
                tracing::error!(error = %e, kind = e.kind(), "Proxy error");
                metrics::record_upstream_error(e.kind());
                RelayedResponse::proxy_error(&e)
            }
        }
    }

    async fn try_forward(&self, inbound: InboundRequest) -> Result<RelayedResponse, ForwardError> {
        let outbound = self.build_outbound(inbound)?;

        tracing::info!(
            method = %outbound.method,
            url = %outbound.url,
            headers = ?redacted(&outbound.headers),
            "Proxying request"
        );
        if self.settings.log_payloads {
            match &outbound.body {
                Some(body) => {
                    tracing::info!(body = %String::from_utf8_lossy(body), "Outbound body")
                }
                None => tracing::info!("No body"),
            }
        }

        let response = self.client.dispatch(outbound).await?;

        tracing::info!(status = response.status.as_u16(), "Upstream responded");
        if self.settings.log_payloads {
            tracing::info!(body = %response.body, "Upstream body");
        }

        Ok(RelayedResponse::from_upstream(response))
    }

    fn build_outbound(&self, inbound: InboundRequest) -> Result<OutboundRequest, ForwardError> {
        let suffix = target::strip_prefix(&inbound.path, &self.settings.path_prefix)
            .ok_or_else(|| ForwardError::OutsidePrefix(inbound.path.clone()))?;
        let url = target::upstream_url(&self.settings.base_url, suffix, &inbound.query);

        let body = if carries_body(&inbound.method) {
            inbound.body.as_ref().map(encode_body)
        } else {
            None
        };

        Ok(OutboundRequest {
            headers: outbound_headers(&inbound.headers),
            method: inbound.method,
            url,
            body,
        })
    }
}

/// POST, PUT and PATCH forward their body; every other method is sent without one.
pub fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Compact JSON re-serialisation of a JSON body. Non-JSON bytes pass through unchanged.
pub fn encode_body(body: &Bytes) -> Bytes {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) => serde_json::to_vec(&value)
            .map(Bytes::from)
            .unwrap_or_else(|_| body.clone()),
        Err(_) => body.clone(),
    }
}

/// `Authorization` (or empty) and `Content-Type` (or `application/json`). Nothing else.
pub fn outbound_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(2);
    headers.insert(
        header::AUTHORIZATION,
        inbound
            .get(header::AUTHORIZATION)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("")),
    );
    headers.insert(
        header::CONTENT_TYPE,
        inbound
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
    );
    headers
}

fn redacted(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if *name == header::AUTHORIZATION && !value.is_empty() {
                "<redacted>".to_string()
            } else {
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            };
            (name.to_string(), shown)
        })
        .collect()
}
