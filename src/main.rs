//! Forwarding proxy.
//!
//! Accepts any request under a fixed path prefix, re-issues it against a
//! single upstream base URL and relays the upstream status and body back with
//! permissive CORS headers.
//!
//! ```text
//!     Client ──▶ /api/proxy/{suffix}?{query} ──▶ forward ──▶ {base}/{suffix}?{query} ──▶ Upstream
//!     Client ◀── status + JSON-or-string body ◀─────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use forward_proxy::lifecycle::{resolve_config, startup, ConfigOverrides};
use forward_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "forward-proxy")]
#[command(about = "Forward requests under a path prefix to a fixed upstream", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind.
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on.
    #[arg(short, long)]
    port: Option<u16>,

    /// Upstream base URL, e.g. https://api.example.com/v2
    #[arg(long)]
    upstream_url: Option<String>,

    /// Inbound path prefix to strip, e.g. /api/proxy/
    #[arg(long)]
    path_prefix: Option<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            upstream_url: self.upstream_url.clone(),
            path_prefix: self.path_prefix.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref(), cli.overrides())?;
    logging::init_logging(&config.observability)?;

    tracing::info!("forward-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        upstream = %config.upstream.base_url,
        connect_timeout_secs = ?config.timeouts.connect_secs,
        request_timeout_secs = ?config.timeouts.request_secs,
        "Configuration loaded"
    );

    startup::run(config).await?;
    Ok(())
}
