//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve configuration (file, then command line overrides, then validation)
//! - Initialize metrics and the outbound client
//! - Bind the listener and serve until a signal arrives
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last (traffic only when ready)

use std::net::{AddrParseError, SocketAddr};
use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinError;

use crate::config::loader::read_config;
use crate::config::{validate_config, ConfigError, ProxyConfig};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// Errors that abort startup or end the serve loop abnormally.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("metrics address: {0}")]
    MetricsAddress(#[from] AddrParseError),

    #[error("metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("listener: {0}")]
    Io(#[from] std::io::Error),

    #[error("server task: {0}")]
    Task(#[from] JoinError),
}

/// Command line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub upstream_url: Option<String>,
    pub path_prefix: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut ProxyConfig) {
        if let Some(host) = self.host {
            config.listener.host = host;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(url) = self.upstream_url {
            config.upstream.base_url = url;
        }
        if let Some(prefix) = self.path_prefix {
            config.upstream.path_prefix = prefix;
        }
    }
}

/// Read the optional config file, apply overrides and validate the result.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ProxyConfig::default(),
    };
    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Bring the proxy up and serve until SIGINT/SIGTERM, then drain.
pub async fn run(config: ProxyConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let grace = Duration::from_secs(config.lifecycle.shutdown_grace_secs);
    let bind_address = config.listener.bind_address();
    let base_url = config.upstream.base_url.clone();
    let prefix = config.upstream.path_prefix.clone();

    let server = HttpServer::new(config)?;
    let listener = TcpListener::bind(&bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!("Proxy server running on http://{}", local_addr);
    tracing::info!("Forwarding {}* to {}", prefix, base_url);
    tracing::info!("Health check: http://{}/health", local_addr);

    let shutdown = Shutdown::new(grace);
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut server_task => {
            result??;
            return Ok(());
        }
        _ = signals::wait_for_signal() => {}
    }

    shutdown.trigger();
    if let Some(result) = shutdown.drain(server_task).await? {
        result?;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
