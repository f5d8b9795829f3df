//! Forwarding proxy library.

pub mod config;
pub mod forward;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use forward::{Forwarder, UpstreamClient};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
