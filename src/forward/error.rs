//! Forwarding errors.

use std::error::Error as StdError;

use thiserror::Error;

/// Failures that stop a request before an upstream response is received.
///
/// Upstream 4xx/5xx answers are not errors; they are relayed as-is.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Network-level failure reaching the upstream (DNS, refused, reset, bad URL).
    #[error("{0}")]
    Transport(String),

    /// A configured connect or request timeout expired.
    #[error("{0}")]
    Timeout(String),

    /// The detached outbound task ended without producing a result.
    #[error("upstream call aborted: {0}")]
    Aborted(String),

    /// The inbound path does not start with the proxied prefix.
    #[error("path '{0}' is outside the proxied prefix")]
    OutsidePrefix(String),
}

impl ForwardError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::Transport(_) => "transport",
            ForwardError::Timeout(_) => "timeout",
            ForwardError::Aborted(_) => "aborted",
            ForwardError::OutsidePrefix(_) => "outside_prefix",
        }
    }
}

/// Render an error together with its source chain, e.g.
/// `error sending request: client error (Connect): tcp connect error: Connection refused`.
pub(crate) fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}
