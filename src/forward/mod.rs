//! Forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! InboundRequest (extracted by http::request)
//!     → target.rs (strip prefix, re-encode query, build upstream URL)
//!     → forwarder.rs (narrow headers, encode body)
//!     → upstream.rs (one outbound call, full body buffered)
//!     → RelayedResponse (upstream status + JSON-or-raw body)
//! ```
//!
//! # Design Decisions
//! - No retries; a transport failure is reported once as a 500
//! - Non-2xx upstream answers are relayed, not treated as errors
//! - The HTTP client is injected through `UpstreamClient`

pub mod error;
pub mod forwarder;
pub mod target;
pub mod types;
pub mod upstream;

#[cfg(test)]
pub(crate) mod mock;

pub use error::ForwardError;
pub use forwarder::Forwarder;
pub use types::{InboundRequest, OutboundRequest, OutboundResponse, RelayedResponse, ResponseBody};
pub use upstream::{build_client, UpstreamClient};
