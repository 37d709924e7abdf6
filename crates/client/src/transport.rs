use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;

use cache::Method;
use thiserror::Error;
use ureq::{Agent, AgentBuilder};

/// One outbound HTTP request, borrowed from the gateway.
#[derive(Debug, Clone, Copy)]
pub struct TransportRequest<'a> {
    pub method: Method,
    pub url: &'a str,
    pub query: &'a BTreeMap<String, String>,
    pub headers: &'a [(&'a str, &'a str)],
    pub body: Option<&'a str>,
}

/// Raw status and body. Any status, including errors, is a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub content: Vec<u8>,
}

/// The service could not be reached or the body could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Issues requests against the encoding service.
///
/// The production implementation is [`HttpTransport`]; tests script responses
/// through their own implementations.
pub trait Transport {
    fn issue(&self, request: &TransportRequest<'_>) -> Result<TransportResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn issue(&self, request: &TransportRequest<'_>) -> Result<TransportResponse, TransportError> {
        (**self).issue(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn issue(&self, request: &TransportRequest<'_>) -> Result<TransportResponse, TransportError> {
        (**self).issue(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn issue(&self, request: &TransportRequest<'_>) -> Result<TransportResponse, TransportError> {
        (**self).issue(request)
    }
}

/// Blocking HTTP transport on a `ureq` agent.
///
/// No read or overall timeout is set. Connecting uses ureq's default connect
/// timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    agent: Agent,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            agent: AgentBuilder::new().build(),
        }
    }

    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn issue(&self, request: &TransportRequest<'_>) -> Result<TransportResponse, TransportError> {
        let mut call = self.agent.request(request.method.as_str(), request.url);
        for (key, value) in request.query {
            call = call.query(key, value);
        }
        for (name, value) in request.headers {
            call = call.set(name, value);
        }

        let result = match request.body {
            Some(body) => call.send_string(body),
            None => call.call(),
        };

        // ureq reports 4xx/5xx as errors; the gateway wants them as responses.
        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(err)) => return Err(TransportError(err.to_string())),
        };

        let status = response.status();
        let mut content = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut content)
            .map_err(|e| TransportError(format!("failed to read response body: {e}")))?;

        Ok(TransportResponse { status, content })
    }
}
