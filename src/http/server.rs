//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the health and proxy handlers
//! - Wire up middleware (request ID, tracing, CORS, body limit)
//! - Bind server to listener
//! - Drain in-flight requests on shutdown

use std::time::Instant;

use axum::extract::{DefaultBodyLimit, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::forward::{build_client, Forwarder, InboundRequest, UpstreamClient};
use crate::health::health_handler;
use crate::http::request::{make_request_span, UuidRequestId};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState<C> {
    pub forwarder: Forwarder<C>,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server that forwards through a pooled `reqwest` client.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let client = build_client(&config)?;
        Ok(Self::with_client(config, client))
    }

    /// Create a server around any upstream client.
    pub fn with_client<C: UpstreamClient>(config: ProxyConfig, client: C) -> Self {
        let router = build_router(&config, client);
        Self { router, config }
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            prefix = %self.config.upstream.path_prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router<C: UpstreamClient>(config: &ProxyConfig, client: C) -> Router {
    let prefix = config.upstream.path_prefix.as_str();
    let state = AppState {
        forwarder: Forwarder::new(config, client),
    };

    Router::new()
        .route("/health", get(health_handler))
        .route(prefix, any(proxy_handler::<C>))
        .route(&format!("{}{{*suffix}}", prefix), any(proxy_handler::<C>))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
}

/// Forwards everything under the configured prefix.
async fn proxy_handler<C: UpstreamClient>(
    State(state): State<AppState<C>>,
    inbound: InboundRequest,
) -> Response {
    let start_time = Instant::now();
    let method = inbound.method.clone();

    let relayed = state.forwarder.forward(inbound).await;

    metrics::record_request(method.as_str(), relayed.status.as_u16(), start_time);
    relayed.into_response()
}
