//! In-crate test doubles.

use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use crate::error::MistyError;
use crate::http::{HttpTransport, HttpTransportRequest, HttpTransportResponse};

/// Canned transport outcome.
pub(crate) enum Reply {
    Response(HttpTransportResponse),
    TransportError(String),
}

impl Reply {
    pub(crate) fn json(status: u16, body: serde_json::Value) -> Self {
        Self::bytes(status, body.to_string().into_bytes())
    }

    pub(crate) fn text(status: u16, body: &str) -> Self {
        Self::bytes(status, body.as_bytes().to_vec())
    }

    pub(crate) fn bytes(status: u16, body: Vec<u8>) -> Self {
        Self::Response(HttpTransportResponse {
            status,
            headers: BTreeMap::new(),
            body,
        })
    }

    pub(crate) fn transport_error(message: &str) -> Self {
        Self::TransportError(message.to_string())
    }
}

/// Replays queued replies in order and records every request.
#[derive(Default)]
pub(crate) struct FakeTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<HttpTransportRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub(crate) fn requests(&self) -> Vec<HttpTransportRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn execute(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportResponse, MistyError> {
        self.requests.lock().unwrap().push(request);
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Response(resp)) => Ok(resp),
            Some(Reply::TransportError(msg)) => Err(MistyError::Transport(msg)),
            None => Err(MistyError::Transport("no reply queued".to_string())),
        }
    }
}
