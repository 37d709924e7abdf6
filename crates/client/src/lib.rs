//! Blocking client for a semantic fingerprint (SDR) encoding service.
//!
//! Every call goes through the same path: build a request descriptor, check the
//! on-disk cache, hit the service on a miss, classify what came back, cache it,
//! and reshape it for the caller.
//!
//! The interesting part is the failure behavior. A non-200 status or a body
//! that isn't JSON is a *soft fault*: it gets logged, cached as an empty list,
//! and the fingerprint operations substitute a placeholder seeded from the
//! input text. The same unencodable word always gets the same placeholder, and
//! it only costs one network round trip ever (with caching on). The flip side
//! is that "word not in vocabulary" and "service returned a 500" look the same
//! to callers, so watch the `gateway_soft_fault_*` warnings.
//!
//! Things that are *not* soft: passing a multi-token string to the single-term
//! call, an empty bitmap to [`CorticalClient::nearest_terms`], an unreachable
//! host, or a cache directory you can't write to.
//!
//! ## Threading notes
//!
//! None. One request at a time, blocking, no timeout beyond the HTTP agent's
//! defaults. Two processes may share a cache directory; the worst case is
//! both writing the same file with the same bytes.
//!
//! ## Quick example
//!
//! ```no_run
//! use client::{ClientConfig, CorticalClient};
//!
//! let client = CorticalClient::new(ClientConfig {
//!     api_key: Some("your-api-key".into()),
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! let owl = client.fingerprint_for_term("owl").unwrap();
//! let bird = client.fingerprint_for_term("bird").unwrap();
//! let metrics = client.compare(owl.bitmap(), bird.bitmap()).unwrap();
//! println!("{metrics:?}");
//! ```

pub mod config;
pub mod error;
pub mod types;

mod gateway;
mod transport;

#[cfg(test)]
mod testing;

pub use crate::config::{ClientConfig, API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_CACHE_DIR};
pub use crate::error::ClientError;
pub use crate::gateway::{Gateway, Outcome, SoftFault};
pub use crate::transport::{
    HttpTransport, Transport, TransportError, TransportRequest, TransportResponse,
};
pub use crate::types::{ComparisonResult, FingerprintInfo, SimilarTerm, TermContext};

use cache::{CacheStore, Method, RequestDescriptor};
use codec::{
    expand_to_binary_string, placeholder_fingerprint, FingerprintBitmap, RetinaProfile,
    TARGET_SPARSITY,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::types::ServiceFingerprint;

/// Page size the service is asked for on list endpoints.
const MAX_RESULTS: u32 = 10;

/// Client facade over the gateway, cache, and fingerprint codec.
#[derive(Debug)]
pub struct CorticalClient<T = HttpTransport> {
    config: ClientConfig,
    profile: RetinaProfile,
    gateway: Gateway<T>,
}

impl CorticalClient<HttpTransport> {
    /// Client over real HTTP. Does not touch the network or the file system.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_transport(config, HttpTransport::new())
    }
}

impl<T: Transport> CorticalClient<T> {
    /// Client over a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ClientError> {
        let profile = config.retina_profile()?;
        let api_key = config.resolve_api_key()?;
        let cache = CacheStore::new(config.cache_root(), config.use_cache);
        let gateway = Gateway::new(transport, cache, config.base_url.clone(), api_key);
        Ok(Self {
            config,
            profile,
            gateway,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn retina(&self) -> RetinaProfile {
        self.profile
    }

    pub fn gateway(&self) -> &Gateway<T> {
        &self.gateway
    }

    /// Low-level call with a method name; unknown methods are usage errors.
    pub fn call(
        &self,
        method: &str,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&str>,
    ) -> Result<Outcome, ClientError> {
        let method: Method = method.parse()?;
        let mut descriptor = RequestDescriptor::new(method, path);
        for (key, value) in query {
            descriptor = descriptor.param(*key, value);
        }
        descriptor.body = body.map(str::to_string);
        self.gateway.call(&descriptor)
    }

    /// Fingerprint for a single token.
    ///
    /// Whitespace anywhere in `term` is a usage error raised before any
    /// network call; use [`fingerprint_for_text`](Self::fingerprint_for_text)
    /// for phrases.
    pub fn fingerprint_for_term(&self, term: &str) -> Result<FingerprintInfo, ClientError> {
        if term.is_empty() {
            return Err(ClientError::Usage("term must not be empty".into()));
        }
        if term.chars().any(char::is_whitespace) {
            return Err(ClientError::Usage(format!(
                "'{term}' has more than one token; use fingerprint_for_text"
            )));
        }

        let descriptor = RequestDescriptor::new(Method::Get, "/terms")
            .param("retina_name", &self.config.retina)
            .param("term", term)
            .param("start_index", 0)
            .param("max_results", MAX_RESULTS)
            .param("get_fingerprint", true);
        let outcome = self.gateway.call(&descriptor)?;
        self.fingerprint_from_outcome(term, &descriptor.path, outcome)
    }

    /// Fingerprint for free text of any length.
    pub fn fingerprint_for_text(&self, text: &str) -> Result<FingerprintInfo, ClientError> {
        let descriptor = RequestDescriptor::new(Method::Post, "/text")
            .param("retina_name", &self.config.retina)
            .body(text);
        let outcome = self.gateway.call(&descriptor)?;
        self.fingerprint_from_outcome(text, &descriptor.path, outcome)
    }

    /// Dense `'0'`/`'1'` string of a single term's fingerprint.
    pub fn binary_string_for_term(&self, term: &str) -> Result<String, ClientError> {
        let info = self.fingerprint_for_term(term)?;
        Ok(expand_to_binary_string(info.bitmap(), info.width(), info.height())?)
    }

    /// Terms whose fingerprints are closest to `bitmap`.
    pub fn nearest_terms(
        &self,
        bitmap: &FingerprintBitmap,
    ) -> Result<Vec<SimilarTerm>, ClientError> {
        if bitmap.is_empty() {
            return Err(ClientError::Usage(
                "cannot look up terms for an empty bitmap".into(),
            ));
        }

        let body = json!({ "positions": bitmap.positions() }).to_string();
        let descriptor = RequestDescriptor::new(Method::Post, "/expressions/similar_terms")
            .param("retina_name", &self.config.retina)
            .param("start_index", 0)
            .param("max_results", MAX_RESULTS)
            .param("get_fingerprint", false)
            .param("sparsity", TARGET_SPARSITY)
            .param_opt("pos_type", self.config.part_of_speech.as_deref())
            .body(body);
        let outcome = self.gateway.call(&descriptor)?;
        Ok(decode_or_empty(&descriptor.path, outcome))
    }

    /// Splits `text` into sentences of tokens, as the service tokenizes them.
    pub fn tokenize(&self, text: &str) -> Result<Vec<Vec<String>>, ClientError> {
        let descriptor = RequestDescriptor::new(Method::Post, "/text/tokenize")
            .param("retina_name", &self.config.retina)
            .body(text);
        let outcome = self.gateway.call(&descriptor)?;
        let sentences: Vec<String> = decode_or_empty(&descriptor.path, outcome);
        Ok(sentences
            .iter()
            .map(|sentence| {
                sentence
                    .split(',')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .collect())
    }

    /// Service-computed metrics between two bitmaps; `None` when the service
    /// returned nothing usable.
    pub fn compare(
        &self,
        left: &FingerprintBitmap,
        right: &FingerprintBitmap,
    ) -> Result<Option<ComparisonResult>, ClientError> {
        let body = json!([
            { "positions": left.positions() },
            { "positions": right.positions() }
        ])
        .to_string();
        let descriptor = RequestDescriptor::new(Method::Post, "/compare")
            .param("retina_name", &self.config.retina)
            .body(body);
        let outcome = self.gateway.call(&descriptor)?;
        Ok(decode_or_empty(&descriptor.path, outcome))
    }

    /// Distinct senses of `term`, each with its own fingerprint.
    pub fn term_contexts(&self, term: &str) -> Result<Vec<TermContext>, ClientError> {
        let descriptor = RequestDescriptor::new(Method::Get, "/terms/contexts")
            .param("retina_name", &self.config.retina)
            .param("term", term)
            .param("start_index", 0)
            .param("max_results", MAX_RESULTS)
            .param("get_fingerprint", true);
        let outcome = self.gateway.call(&descriptor)?;
        Ok(decode_or_empty(&descriptor.path, outcome))
    }

    /// Most characteristic keywords of `text`.
    pub fn extract_keywords(&self, text: &str) -> Result<Vec<String>, ClientError> {
        let descriptor = RequestDescriptor::new(Method::Post, "/text/keywords")
            .param("retina_name", &self.config.retina)
            .body(text);
        let outcome = self.gateway.call(&descriptor)?;
        Ok(decode_or_empty(&descriptor.path, outcome))
    }

    /// Category filter fingerprint learned from example texts.
    pub fn create_classification<S: AsRef<str>>(
        &self,
        name: &str,
        positives: &[S],
        negatives: &[S],
    ) -> Result<FingerprintInfo, ClientError> {
        let examples = |texts: &[S]| -> Vec<Value> {
            texts
                .iter()
                .map(|text| json!({ "text": text.as_ref() }))
                .collect()
        };
        let body = json!({
            "positiveExamples": examples(positives),
            "negativeExamples": examples(negatives),
        })
        .to_string();
        let descriptor = RequestDescriptor::new(Method::Post, "/classify/create_category_filter")
            .param("retina_name", &self.config.retina)
            .param("filter_name", name)
            .body(body);
        let outcome = self.gateway.call(&descriptor)?;
        self.fingerprint_from_outcome(name, &descriptor.path, outcome)
    }

    fn fingerprint_from_outcome(
        &self,
        subject: &str,
        path: &str,
        outcome: Outcome,
    ) -> Result<FingerprintInfo, ClientError> {
        // Term and text endpoints answer with a list, classification with an object.
        let first = match outcome.into_value() {
            Value::Array(items) => items.into_iter().next(),
            object @ Value::Object(_) => Some(object),
            _ => None,
        };
        let parsed = match first {
            Some(Value::Object(map)) => ServiceFingerprint::from_object(map),
            _ => None,
        };

        if let Some(fp) = parsed {
            let (width, height) = match (fp.width, fp.height) {
                (Some(width), Some(height)) => (width, height),
                _ => (self.profile.width, self.profile.height),
            };
            let bitmap =
                FingerprintBitmap::within(fp.positions, width as usize * height as usize)?;
            return Ok(FingerprintInfo::new(
                subject, width, height, bitmap, fp.extra, false,
            ));
        }

        info!(
            subject = %subject,
            path = %path,
            fill_mode = %self.config.fill_mode,
            "placeholder_fingerprint"
        );
        let bitmap = placeholder_fingerprint(
            subject,
            self.config.fill_mode,
            self.profile.width,
            self.profile.height,
            TARGET_SPARSITY,
        );
        Ok(FingerprintInfo::new(
            subject,
            self.profile.width,
            self.profile.height,
            bitmap,
            Map::new(),
            true,
        ))
    }
}

/// Decodes a list-or-object response, treating soft faults, the cached `[]`
/// sentinel, and shape mismatches as the empty value.
fn decode_or_empty<D: DeserializeOwned + Default>(path: &str, outcome: Outcome) -> D {
    let value = match outcome {
        Outcome::SoftFault(_) => return D::default(),
        Outcome::Value(Value::Array(items)) if items.is_empty() => return D::default(),
        Outcome::Value(value) => value,
    };
    match serde_json::from_value(value) {
        Ok(decoded) => decoded,
        Err(err) => {
            warn!(path = %path, error = %err, "response_shape_mismatch");
            D::default()
        }
    }
}
