//! The outbound HTTP seam.
//!
//! # Responsibilities
//! - Define `UpstreamClient`, the one place the forwarder touches the network
//! - Build the pooled `reqwest::Client` with the configured timeouts
//! - Map client failures onto `ForwardError`
//!
//! # Design Decisions
//! - The whole response body is buffered before returning (no streaming)
//! - The pooled client is cloned into each request; it carries no per-request state

use std::future::Future;

use crate::config::ProxyConfig;
use crate::forward::error::{error_chain, ForwardError};
use crate::forward::types::{OutboundRequest, OutboundResponse};

/// Issues one outbound request and waits for the complete response.
pub trait UpstreamClient: Clone + Send + Sync + 'static {
    fn dispatch(
        &self,
        request: OutboundRequest,
    ) -> impl Future<Output = Result<OutboundResponse, ForwardError>> + Send;
}

impl UpstreamClient for reqwest::Client {
    async fn dispatch(&self, request: OutboundRequest) -> Result<OutboundResponse, ForwardError> {
        let mut builder = self
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(OutboundResponse { status, body })
    }
}

impl From<reqwest::Error> for ForwardError {
    fn from(err: reqwest::Error) -> Self {
        let message = error_chain(&err);
        if err.is_timeout() {
            ForwardError::Timeout(message)
        } else {
            ForwardError::Transport(message)
        }
    }
}

/// Build the shared outbound client.
pub fn build_client(config: &ProxyConfig) -> Result<reqwest::Client, reqwest::Error> {
    let timeouts = &config.timeouts;
    let mut builder = reqwest::Client::builder();
    if !config.upstream.system_proxy {
        builder = builder.no_proxy();
    }
    if let Some(connect) = timeouts.connect() {
        builder = builder.connect_timeout(connect);
    }
    if let Some(total) = timeouts.request() {
        builder = builder.timeout(total);
    }
    builder.build()
}
