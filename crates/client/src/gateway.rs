use std::fmt;
use std::time::Instant;

use cache::{compute_key, CacheStore, Lookup, RequestDescriptor};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::transport::{Transport, TransportRequest, TransportResponse};
use crate::ClientError;

/// Longest slice of an error body kept in a [`SoftFault::Status`].
const BODY_EXCERPT_CHARS: usize = 200;

/// A response that carried no usable result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoftFault {
    /// Service answered with a status other than 200.
    Status { status: u16, body: String },
    /// Service answered 200 with a payload that is not JSON.
    Malformed { reason: String },
}

impl fmt::Display for SoftFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoftFault::Status { status, body } => write!(f, "response {status}: {body}"),
            SoftFault::Malformed { reason } => write!(f, "unparseable response: {reason}"),
        }
    }
}

/// Classified result of one gateway call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Parsed JSON, either fresh or from the cache.
    Value(Value),
    /// Fresh response that produced nothing usable.
    SoftFault(SoftFault),
}

impl Outcome {
    pub fn is_soft_fault(&self) -> bool {
        matches!(self, Outcome::SoftFault(_))
    }

    /// Parsed value, with soft faults collapsed to the empty list `[]`.
    pub fn into_value(self) -> Value {
        match self {
            Outcome::Value(value) => value,
            Outcome::SoftFault(_) => Value::Array(Vec::new()),
        }
    }
}

/// Runs one logical remote call: cache read, transport, classification, cache write.
///
/// With caching enabled each distinct [`RequestDescriptor`] reaches the
/// transport at most once; soft faults are cached as `[]` so unencodable input
/// does not go back to the network either.
#[derive(Debug)]
pub struct Gateway<T> {
    transport: T,
    cache: CacheStore,
    base_url: String,
    api_key: String,
}

impl<T: Transport> Gateway<T> {
    pub fn new(
        transport: T,
        cache: CacheStore,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            cache,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Executes `descriptor`, serving it from the cache when possible.
    pub fn call(&self, descriptor: &RequestDescriptor) -> Result<Outcome, ClientError> {
        let start = Instant::now();
        let key = compute_key(descriptor);

        if let Lookup::Hit(value) = self.cache.get::<Value>(&key)? {
            debug!(
                method = %descriptor.method,
                path = %descriptor.path,
                key = %key,
                "gateway_cache_hit"
            );
            return Ok(Outcome::Value(value));
        }

        let url = self.url_for(&descriptor.path);
        let headers = [
            ("api-key", self.api_key.as_str()),
            ("Accept", "application/json"),
            ("Content-Type", "application/json"),
        ];
        let request = TransportRequest {
            method: descriptor.method,
            url: &url,
            query: &descriptor.query,
            headers: &headers,
            body: descriptor.body.as_deref(),
        };

        let response = match self.transport.issue(&request) {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    method = %descriptor.method,
                    url = %url,
                    error = %err,
                    "gateway_unreachable"
                );
                return Err(ClientError::Unreachable {
                    url,
                    reason: err.to_string(),
                });
            }
        };

        let outcome = classify(&response);
        let elapsed_micros = start.elapsed().as_micros();
        match &outcome {
            Outcome::Value(_) => info!(
                method = %descriptor.method,
                path = %descriptor.path,
                status = response.status,
                elapsed_micros,
                "gateway_success"
            ),
            Outcome::SoftFault(fault @ SoftFault::Status { status, .. }) => warn!(
                method = %descriptor.method,
                path = %descriptor.path,
                status = *status,
                fault = %fault,
                elapsed_micros,
                "gateway_soft_fault_status"
            ),
            Outcome::SoftFault(fault @ SoftFault::Malformed { .. }) => warn!(
                method = %descriptor.method,
                path = %descriptor.path,
                fault = %fault,
                elapsed_micros,
                "gateway_soft_fault_malformed"
            ),
        }

        let empty = Value::Array(Vec::new());
        let stored = match &outcome {
            Outcome::Value(value) => value,
            Outcome::SoftFault(_) => &empty,
        };
        self.cache.put(&key, stored)?;

        Ok(outcome)
    }

    fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

fn classify(response: &TransportResponse) -> Outcome {
    if response.status != 200 {
        let body: String = String::from_utf8_lossy(&response.content)
            .chars()
            .take(BODY_EXCERPT_CHARS)
            .collect();
        return Outcome::SoftFault(SoftFault::Status {
            status: response.status,
            body,
        });
    }

    match serde_json::from_slice::<Value>(&response.content) {
        Ok(value) => Outcome::Value(value),
        Err(err) => Outcome::SoftFault(SoftFault::Malformed {
            reason: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use cache::Method;
    use serde_json::json;
    use tempfile::tempdir;

    fn gateway<'a>(
        transport: &'a ScriptedTransport,
        cache: CacheStore,
    ) -> Gateway<&'a ScriptedTransport> {
        Gateway::new(transport, cache, "http://api.example.com/rest/", "test-key")
    }

    fn terms(term: &str) -> RequestDescriptor {
        RequestDescriptor::new(Method::Get, "/terms")
            .param("retina_name", "en_synonymous")
            .param("term", term)
    }

    #[test]
    fn success_returns_parsed_json() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, r#"{"dummy": "mock body"}"#);
        let gw = gateway(&transport, CacheStore::disabled());

        let outcome = gw.call(&terms("owl")).unwrap();
        assert_eq!(outcome, Outcome::Value(json!({"dummy": "mock body"})));
    }

    #[test]
    fn request_carries_url_params_and_headers() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, "[]");
        let gw = gateway(&transport, CacheStore::disabled());

        gw.call(&terms("owl").body("payload")).unwrap();
        let request = transport.last_request().unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.url, "http://api.example.com/rest/terms");
        assert_eq!(request.query["term"], "owl");
        assert_eq!(request.header("api-key"), Some("test-key"));
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some("payload"));
    }

    #[test]
    fn relative_path_gets_a_separator() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, "[]");
        let gw = Gateway::new(&transport, CacheStore::disabled(), "http://h/rest", "k");
        gw.call(&RequestDescriptor::new(Method::Post, "compare")).unwrap();
        assert_eq!(transport.last_request().unwrap().url, "http://h/rest/compare");
    }

    #[test]
    fn non_200_is_soft_fault() {
        let transport = ScriptedTransport::new();
        transport.push_json(400, r#"{"error": "bad term"}"#);
        let gw = gateway(&transport, CacheStore::disabled());

        let outcome = gw.call(&terms("owl")).unwrap();
        match &outcome {
            Outcome::SoftFault(SoftFault::Status { status, body }) => {
                assert_eq!(*status, 400);
                assert!(body.contains("bad term"));
            }
            other => panic!("expected status fault, got {other:?}"),
        }
        assert_eq!(outcome.into_value(), json!([]));
    }

    #[test]
    fn unparseable_payload_is_soft_fault() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, "<html>oops</html>");
        let gw = gateway(&transport, CacheStore::disabled());

        let outcome = gw.call(&terms("owl")).unwrap();
        assert!(matches!(
            outcome,
            Outcome::SoftFault(SoftFault::Malformed { .. })
        ));
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let transport = ScriptedTransport::new();
        transport.push_json(503, &"x".repeat(5_000));
        let gw = gateway(&transport, CacheStore::disabled());

        match gw.call(&terms("owl")).unwrap() {
            Outcome::SoftFault(SoftFault::Status { body, .. }) => {
                assert_eq!(body.len(), BODY_EXCERPT_CHARS)
            }
            other => panic!("expected status fault, got {other:?}"),
        }
    }

    #[test]
    fn transport_failure_is_unreachable_and_not_cached() {
        let dir = tempdir().unwrap();
        let transport = ScriptedTransport::new();
        transport.push_failure("connection refused");
        let gw = gateway(&transport, CacheStore::new(dir.path().join("c"), true));

        let err = gw.call(&terms("owl")).unwrap_err();
        assert!(matches!(err, ClientError::Unreachable { .. }));
        assert!(!dir.path().join("c").exists());
    }

    #[test]
    fn second_identical_call_is_served_from_cache() {
        let dir = tempdir().unwrap();
        let transport = ScriptedTransport::new();
        transport.push_json(200, r#"[{"term": "owl"}]"#);
        let gw = gateway(&transport, CacheStore::new(dir.path(), true));

        let first = gw.call(&terms("owl")).unwrap();
        let reordered = RequestDescriptor::new(Method::Get, "/terms")
            .param("term", "owl")
            .param("retina_name", "en_synonymous");
        let second = gw.call(&reordered).unwrap();

        assert_eq!(transport.calls(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn soft_faults_are_cached_as_empty_list() {
        let dir = tempdir().unwrap();
        let transport = ScriptedTransport::new();
        transport.push_json(404, "not found");
        let gw = gateway(&transport, CacheStore::new(dir.path(), true));

        assert!(gw.call(&terms("qwzx")).unwrap().is_soft_fault());
        let again = gw.call(&terms("qwzx")).unwrap();
        assert_eq!(again, Outcome::Value(json!([])));
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn disabled_cache_always_hits_transport() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, "[1]");
        transport.push_json(200, "[2]");
        let gw = gateway(&transport, CacheStore::disabled());

        gw.call(&terms("owl")).unwrap();
        let second = gw.call(&terms("owl")).unwrap();
        assert_eq!(transport.calls(), 2);
        assert_eq!(second, Outcome::Value(json!([2])));
    }
}
