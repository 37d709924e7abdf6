#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use cortical::{ClientConfig, Transport, TransportError, TransportRequest, TransportResponse};

/// In-memory stand-in for the encoding service.
///
/// Responses are routed by request path; unrouted paths answer 404. Every
/// request is recorded so tests can count round trips.
#[derive(Debug, Default)]
pub struct MockService {
    routes: HashMap<String, (u16, String)>,
    unreachable: bool,
    seen: RefCell<Vec<SeenRequest>>,
}

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub api_key: Option<String>,
    pub body: Option<String>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn route(mut self, path: &str, status: u16, body: &str) -> Self {
        self.routes
            .insert(path.to_string(), (status, body.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.seen.borrow().len()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.seen.borrow().iter().filter(|r| r.path == path).count()
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.borrow().clone()
    }
}

impl Transport for MockService {
    fn issue(&self, request: &TransportRequest<'_>) -> Result<TransportResponse, TransportError> {
        let path = request
            .url
            .strip_prefix(BASE_URL)
            .unwrap_or(request.url)
            .to_string();
        self.seen.borrow_mut().push(SeenRequest {
            path: path.clone(),
            query: request
                .query
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            api_key: request
                .headers
                .iter()
                .find(|(name, _)| *name == "api-key")
                .map(|(_, value)| value.to_string()),
            body: request.body.map(str::to_string),
        });

        if self.unreachable {
            return Err(TransportError("connection refused".into()));
        }

        let (status, body) = self
            .routes
            .get(&path)
            .cloned()
            .unwrap_or((404, "not found".to_string()));
        Ok(TransportResponse {
            status,
            content: body.into_bytes(),
        })
    }
}

pub const BASE_URL: &str = "http://mock.cortical.test/rest";

pub fn config(cache_dir: &Path) -> ClientConfig {
    ClientConfig {
        api_key: Some("integration-key".into()),
        base_url: BASE_URL.into(),
        cache_dir: cache_dir.to_path_buf(),
        ..ClientConfig::default()
    }
}

pub fn uncached_config() -> ClientConfig {
    ClientConfig {
        api_key: Some("integration-key".into()),
        base_url: BASE_URL.into(),
        use_cache: false,
        ..ClientConfig::default()
    }
}
