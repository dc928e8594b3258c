//! Request description, URL composition and header merging.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use url::Url;

use crate::error::{ExecutionError, UrlError};

/// One logical API call, before URL and header resolution.
///
/// The body is shared bytes so every retry attempt gets a cheap clone of the
/// same payload.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// HTTP method.
    pub method: Method,
    /// Endpoint relative to the client base URL.
    pub endpoint: String,
    /// Request body.
    pub body: Option<Bytes>,
    /// Per-call headers, overriding client defaults with the same name.
    pub headers: HashMap<String, String>,
    /// Query parameters.
    pub query: HashMap<String, String>,
    /// Per-attempt timeout override.
    pub timeout: Option<Duration>,
    /// Attempt budget override.
    pub retry_attempts: Option<u32>,
    /// Status codes to retry on top of the client policy.
    pub retry_on_status: Vec<u16>,
}

impl RequestSpec {
    /// Create a new request for an endpoint.
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: None,
            headers: HashMap::new(),
            query: HashMap::new(),
            timeout: None,
            retry_attempts: None,
            retry_on_status: Vec::new(),
        }
    }

    /// GET request.
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    /// POST request.
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    /// PUT request.
    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    /// PATCH request.
    pub fn patch(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PATCH, endpoint)
    }

    /// DELETE request.
    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    /// Set the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize a value as the JSON body.
    pub fn json<T: Serialize>(mut self, value: &T) -> serde_json::Result<Self> {
        self.body = Some(Bytes::from(serde_json::to_vec(value)?));
        Ok(self)
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add multiple headers.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in headers {
            self.headers.insert(k.into(), v.into());
        }
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add multiple query parameters.
    pub fn queries<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in params {
            self.query.insert(k.into(), v.into());
        }
        self
    }

    /// Override the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the attempt budget.
    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = Some(attempts);
        self
    }

    /// Retry on these status codes as well.
    pub fn retry_on_status(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.retry_on_status.extend(codes);
        self
    }
}

/// Join a base URL and an endpoint, then append query parameters.
///
/// Trailing slashes on `base` are trimmed and one leading slash on `endpoint`
/// is dropped, so the two are always joined by exactly one `/`.
pub fn build_url(
    base: &str,
    endpoint: &str,
    query: &HashMap<String, String>,
) -> Result<Url, UrlError> {
    let base = base.trim_end_matches('/');
    let endpoint = endpoint.strip_prefix('/').unwrap_or(endpoint);
    let joined = format!("{}/{}", base, endpoint);

    let mut url = Url::parse(&joined).map_err(|source| UrlError::Malformed {
        url: joined.clone(),
        source,
    })?;

    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }

    Ok(url)
}

/// Overlay per-call headers on the client defaults.
///
/// Names compare case-insensitively; a per-call header replaces every default
/// value of the same name.
pub fn merge_headers(
    defaults: &HeaderMap,
    per_call: &HashMap<String, String>,
) -> Result<HeaderMap, ExecutionError> {
    let mut merged = defaults.clone();
    for (name, value) in per_call {
        let (name, value) = parse_header(name, value).map_err(|reason| {
            ExecutionError::InvalidHeader {
                name: name.clone(),
                reason,
            }
        })?;
        merged.insert(name, value);
    }
    Ok(merged)
}

/// Parse a header name and value pair.
pub(crate) fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), String> {
    let name = HeaderName::try_from(name).map_err(|e| e.to_string())?;
    let value = HeaderValue::try_from(value).map_err(|e| e.to_string())?;
    Ok((name, value))
}
