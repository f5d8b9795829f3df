//! In-memory upstream used by unit tests.

use std::sync::{Arc, Mutex};

use axum::http::StatusCode;

use crate::forward::error::ForwardError;
use crate::forward::types::{OutboundRequest, OutboundResponse};
use crate::forward::upstream::UpstreamClient;

/// Records every outbound request and answers with a canned reply.
#[derive(Clone)]
pub struct RecordingClient {
    seen: Arc<Mutex<Vec<OutboundRequest>>>,
    reply: Result<(StatusCode, String), String>,
}

impl RecordingClient {
    pub fn replying(status: StatusCode, body: &str) -> Self {
        Self {
            seen: Arc::default(),
            reply: Ok((status, body.to_string())),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            seen: Arc::default(),
            reply: Err(message.to_string()),
        }
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl UpstreamClient for RecordingClient {
    async fn dispatch(&self, request: OutboundRequest) -> Result<OutboundResponse, ForwardError> {
        self.seen.lock().unwrap().push(request);
        match &self.reply {
            Ok((status, body)) => Ok(OutboundResponse {
                status: *status,
                body: body.clone(),
            }),
            Err(message) => Err(ForwardError::Transport(message.clone())),
        }
    }
}
