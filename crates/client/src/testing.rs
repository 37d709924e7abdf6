//! Scripted transport for unit tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

use cache::Method;

use crate::transport::{Transport, TransportError, TransportRequest, TransportResponse};

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub query: BTreeMap<String, String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Replays queued responses in order and records every request.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<TransportResponse, TransportError>>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, status: u16, body: &str) {
        self.responses.borrow_mut().push_back(Ok(TransportResponse {
            status,
            content: body.as_bytes().to_vec(),
        }));
    }

    pub fn push_failure(&self, reason: &str) {
        self.responses
            .borrow_mut()
            .push_back(Err(TransportError(reason.to_string())));
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.borrow().last().cloned()
    }
}

impl Transport for ScriptedTransport {
    fn issue(&self, request: &TransportRequest<'_>) -> Result<TransportResponse, TransportError> {
        self.requests.borrow_mut().push(RecordedRequest {
            method: request.method,
            url: request.url.to_string(),
            query: request.query.clone(),
            headers: request
                .headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: request.body.map(str::to_string),
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted response left".into())))
    }
}
