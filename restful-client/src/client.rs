//! REST client and the retrying request executor.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, HeaderValue, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use url::Url;

use crate::config::{Auth, ClientConfig};
use crate::credentials::build_tls_config;
use crate::error::{AttemptFailure, ConfigError, ExecutionError, Result};
use crate::request::{RequestSpec, build_url, merge_headers, parse_header};
use crate::response::{RequestInfo, Response};
use crate::retry::{AttemptResult, Transition, is_retryable_error};

/// REST client bound to one base URL.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct RestClient {
    inner: reqwest::Client,
    config: Arc<ClientConfig>,
    default_headers: Arc<HeaderMap>,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.config.base_url)
            .field("auth", &self.config.auth.kind())
            .finish_non_exhaustive()
    }
}

/// Retry loop states.
enum State {
    Attempt(u32),
    Backoff { attempt: u32, delay: Duration },
    Exhausted { attempts: u32, last: AttemptFailure },
    Done(Response),
}

impl RestClient {
    /// Create a new client, validating the base URL and loading credentials.
    pub fn new(config: ClientConfig) -> std::result::Result<Self, ConfigError> {
        let mut config = config.normalized();
        config.base_url = validate_base_url(&config.base_url)?;

        let default_headers = build_default_headers(&config)?;

        let max_idle = if config.disable_keep_alives {
            0
        } else {
            config.max_idle_conns
        };
        let builder = reqwest::Client::builder()
            .pool_idle_timeout(config.idle_conn_timeout)
            .pool_max_idle_per_host(max_idle)
            .gzip(true)
            .brotli(true);
        let builder = build_tls_config(&config)?.apply(builder)?;
        let inner = builder.build()?;

        debug!(
            base_url = %config.base_url,
            auth = config.auth.kind(),
            timeout_ms = config.timeout.as_millis() as u64,
            retry_attempts = config.retry_attempts,
            "REST client initialized"
        );

        Ok(Self {
            inner,
            config: Arc::new(config),
            default_headers: Arc::new(default_headers),
        })
    }

    /// Get the client configuration, with defaults applied.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Headers sent with every request.
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// Execute a request, retrying per the client policy.
    pub async fn execute(&self, spec: &RequestSpec) -> Result<Response> {
        self.execute_with_cancel(spec, &CancellationToken::new())
            .await
    }

    /// Execute a request that can be abandoned through `cancel`.
    ///
    /// Cancellation is observed before each attempt, during network I/O and
    /// during backoff sleeps.
    pub async fn execute_with_cancel(
        &self,
        spec: &RequestSpec,
        cancel: &CancellationToken,
    ) -> Result<Response> {
        let url = build_url(&self.config.base_url, &spec.endpoint, &spec.query)?;
        let headers = merge_headers(&self.default_headers, &spec.headers)?;
        let info = RequestInfo {
            method: spec.method.clone(),
            url,
            headers,
        };

        let timeout = spec
            .timeout
            .filter(|t| !t.is_zero())
            .unwrap_or(self.config.timeout);
        let max_attempts = spec
            .retry_attempts
            .filter(|n| *n > 0)
            .unwrap_or(self.config.retry_attempts);

        let mut state = State::Attempt(0);
        loop {
            state = match state {
                State::Attempt(attempt) => {
                    if cancel.is_cancelled() {
                        return Err(ExecutionError::Cancelled);
                    }
                    debug!(
                        method = %info.method,
                        url = %info.url,
                        attempt = attempt + 1,
                        max_attempts,
                        "sending request"
                    );

                    let outcome = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(ExecutionError::Cancelled),
                        outcome = self.send_once(&info, spec.body.clone(), timeout) => outcome,
                    };
                    self.classify(outcome, &info, attempt, max_attempts, spec, cancel)?
                }
                State::Backoff { attempt, delay } => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(ExecutionError::Cancelled),
                        _ = tokio::time::sleep(delay) => State::Attempt(attempt + 1),
                    }
                }
                State::Exhausted { attempts, last } => {
                    warn!(
                        method = %info.method,
                        url = %info.url,
                        attempts,
                        error = %last,
                        "request failed, retries exhausted"
                    );
                    return Err(ExecutionError::RetriesExhausted { attempts, last });
                }
                State::Done(response) => {
                    trace!(
                        method = %info.method,
                        url = %info.url,
                        status = response.status().as_u16(),
                        attempts = response.attempts(),
                        "request completed"
                    );
                    return Ok(response);
                }
            };
        }
    }

    /// Turn one attempt's outcome into the next state.
    fn classify(
        &self,
        outcome: std::result::Result<(StatusCode, HeaderMap, Bytes), AttemptFailure>,
        info: &RequestInfo,
        attempt: u32,
        max_attempts: u32,
        spec: &RequestSpec,
        cancel: &CancellationToken,
    ) -> Result<State> {
        let (result, outcome) = match outcome {
            Ok(parts) => (AttemptResult::Status(parts.0.as_u16()), Ok(parts)),
            Err(failure) => {
                let result = match &failure {
                    AttemptFailure::Transport(e) => {
                        if cancel.is_cancelled() {
                            return Err(ExecutionError::Cancelled);
                        }
                        let retryable = is_retryable_error(e);
                        debug!(
                            method = %info.method,
                            url = %info.url,
                            attempt = attempt + 1,
                            transient = retryable,
                            error = %e,
                            "transport failure"
                        );
                        AttemptResult::Transport { retryable }
                    }
                    AttemptFailure::BodyRead { status, .. } => AttemptResult::BodyRead {
                        status: status.as_u16(),
                    },
                    AttemptFailure::Status { status, .. } => {
                        AttemptResult::Status(status.as_u16())
                    }
                };
                (result, Err(failure))
            }
        };

        let transition =
            self.config
                .retry
                .next_transition(result, attempt, max_attempts, &spec.retry_on_status);

        let failure = match (transition, outcome) {
            (Transition::Done, Ok((status, headers, body))) => {
                return Ok(State::Done(Response::new(
                    status,
                    headers,
                    body,
                    info.clone(),
                    attempt + 1,
                )));
            }
            (_, Ok((status, _, body))) => AttemptFailure::Status { status, body },
            (_, Err(failure)) => failure,
        };

        let next = match transition {
            Transition::Backoff(delay) => {
                warn!(
                    method = %info.method,
                    url = %info.url,
                    attempt = attempt + 1,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %failure,
                    "request attempt failed, retrying"
                );
                State::Backoff { attempt, delay }
            }
            Transition::Abort => match failure {
                AttemptFailure::BodyRead { status, source } => {
                    return Err(ExecutionError::BodyReadFailure { status, source });
                }
                last => State::Exhausted {
                    attempts: attempt + 1,
                    last,
                },
            },
            Transition::Exhausted | Transition::Done => State::Exhausted {
                attempts: attempt + 1,
                last: failure,
            },
        };
        Ok(next)
    }

    /// Send one attempt and read its body.
    async fn send_once(
        &self,
        info: &RequestInfo,
        body: Option<Bytes>,
        timeout: Duration,
    ) -> std::result::Result<(StatusCode, HeaderMap, Bytes), AttemptFailure> {
        let mut request = self
            .inner
            .request(info.method.clone(), info.url.clone())
            .headers(info.headers.clone())
            .timeout(timeout);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(AttemptFailure::Transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|source| AttemptFailure::BodyRead { status, source })?;

        Ok((status, headers, body))
    }
}

/// Check the base URL is present, schemed and has a host.
fn validate_base_url(base_url: &str) -> std::result::Result<String, ConfigError> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingBaseUrl);
    }

    let malformed = |reason: String| ConfigError::MalformedBaseUrl {
        url: trimmed.to_string(),
        reason,
    };
    let parsed = Url::parse(trimmed).map_err(|e| malformed(e.to_string()))?;
    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
        return Err(malformed("URL must include a scheme and host".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Headers sent on every request before per-call overrides.
fn build_default_headers(config: &ClientConfig) -> std::result::Result<HeaderMap, ConfigError> {
    let invalid = |name: &str, reason: String| ConfigError::InvalidHeader {
        name: name.to_string(),
        reason,
    };

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    let user_agent = HeaderValue::try_from(config.user_agent.as_str())
        .map_err(|e| invalid(USER_AGENT.as_str(), e.to_string()))?;
    headers.insert(USER_AGENT, user_agent);

    if let Auth::Token { token, header } = &config.auth {
        let (name, mut value) = parse_header(header, token).map_err(|e| invalid(header, e))?;
        value.set_sensitive(true);
        headers.insert(name, value);
    }

    for (name, value) in &config.default_headers {
        let (name, value) = parse_header(name, value).map_err(|e| invalid(name, e))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::Method;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::retry::RetryPolicy;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::exponential(Duration::from_millis(5), Duration::from_millis(20))
    }

    fn client_for(base_url: &str) -> RestClient {
        RestClient::new(
            ClientConfig::builder(base_url)
                .retry_policy(fast_policy())
                .build(),
        )
        .expect("client")
    }

    /// Serve raw bytes on every accepted connection, then close it.
    ///
    /// An empty reply closes the connection without reading the request.
    async fn raw_server(reply: &'static [u8]) -> (String, Arc<AtomicUsize>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepts = Arc::new(AtomicUsize::new(0));
        let counter = accepts.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                if reply.is_empty() {
                    continue;
                }
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(reply).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}", addr), accepts)
    }

    fn failing_then_ok(failures: usize, status: u16) -> impl Fn(&wiremock::Request) -> ResponseTemplate {
        let calls = Arc::new(AtomicUsize::new(0));
        move |_req: &wiremock::Request| {
            if calls.fetch_add(1, Ordering::SeqCst) < failures {
                ResponseTemplate::new(status)
            } else {
                ResponseTemplate::new(200).set_body_string(r#"{"id":"42"}"#)
            }
        }
    }

    #[test]
    fn test_missing_base_url() {
        let err = RestClient::new(ClientConfig::builder("  ").build()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingBaseUrl));
    }

    #[test]
    fn test_base_url_without_scheme_is_rejected() {
        for url in ["api.example.com", "localhost:8080", "/relative/path"] {
            let err = RestClient::new(ClientConfig::builder(url).build()).unwrap_err();
            assert!(
                matches!(err, ConfigError::MalformedBaseUrl { .. }),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn test_invalid_default_header_is_rejected() {
        let err = RestClient::new(
            ClientConfig::builder("https://api.example.com")
                .default_header("X-Bad", "line\nbreak")
                .build(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHeader { name, .. } if name == "X-Bad"));
    }

    #[test]
    fn test_default_headers() {
        let client = RestClient::new(
            ClientConfig::builder("https://api.example.com")
                .token("Bearer abc", "Authorization")
                .default_header("X-Tenant", "acme")
                .build(),
        )
        .unwrap();

        let headers = client.default_headers();
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[ACCEPT], "application/json");
        assert!(
            headers[USER_AGENT]
                .to_str()
                .unwrap()
                .starts_with("restful-client/")
        );
        assert_eq!(headers["authorization"], "Bearer abc");
        assert!(headers["authorization"].is_sensitive());
        assert_eq!(headers["x-tenant"], "acme");
    }

    #[test]
    fn test_client_with_pem_identity() {
        let client = RestClient::new(
            ClientConfig::builder("https://api.example.com")
                .auth(Auth::Pem {
                    cert: include_str!("../tests/fixtures/client.crt").to_string(),
                    key: include_str!("../tests/fixtures/client.key").to_string(),
                })
                .build(),
        );
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items/42"))
            .respond_with(failing_then_ok(2, 503))
            .expect(3)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let response = client
            .execute(&RequestSpec::get("/items/42").retry_attempts(3))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.attempts(), 3);
        assert_eq!(response.text(), r#"{"id":"42"}"#);
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_does_not_retry_client_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let response = client.execute(&RequestSpec::get("items/1")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.attempts(), 1);
        assert_eq!(response.text(), "missing");
    }

    #[tokio::test]
    async fn test_exhausted_carries_last_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(3)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client.execute(&RequestSpec::get("/items")).await.unwrap_err();

        match &err {
            ExecutionError::RetriesExhausted { attempts, last } => {
                assert_eq!(*attempts, 3);
                assert!(matches!(last, AttemptFailure::Status { .. }));
            }
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
        assert_eq!(err.status_code(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(err.last_body().map(|b| b.as_ref()), Some(&b"boom"[..]));
    }

    #[tokio::test]
    async fn test_per_call_retry_status() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(failing_then_ok(1, 409))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let response = client
            .execute(&RequestSpec::put("/items/1").retry_on_status([409]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.attempts(), 2);
    }

    #[tokio::test]
    async fn test_single_attempt_override() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client
            .execute(&RequestSpec::get("/items").retry_attempts(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::RetriesExhausted { attempts: 1, .. }
        ));
    }

    #[tokio::test]
    async fn test_body_resent_on_every_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/items"))
            .respond_with(failing_then_ok(1, 502))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        client
            .execute(&RequestSpec::post("/items").body(r#"{"name":"widget"}"#))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            assert_eq!(request.body, br#"{"name":"widget"}"#.to_vec());
        }
    }

    #[tokio::test]
    async fn test_retries_on_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(&format!("http://{}", addr));
        let err = client
            .execute(&RequestSpec::get("/items").retry_attempts(2))
            .await
            .unwrap_err();

        match err {
            ExecutionError::RetriesExhausted { attempts, last } => {
                assert_eq!(attempts, 2);
                assert!(matches!(last, AttemptFailure::Transport(_)));
            }
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_retries_when_peer_closes_connection() {
        let (base_url, accepts) = raw_server(b"").await;

        let client = client_for(&base_url);
        let err = client
            .execute(&RequestSpec::get("/items").retry_attempts(3))
            .await
            .unwrap_err();

        match err {
            ExecutionError::RetriesExhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(last, AttemptFailure::Transport(_)));
            }
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
        assert_eq!(accepts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_truncated_success_body_is_not_retried() {
        let (base_url, accepts) =
            raw_server(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nabc").await;

        let client = client_for(&base_url);
        let err = client
            .execute(&RequestSpec::get("/items").retry_attempts(3))
            .await
            .unwrap_err();

        match err {
            ExecutionError::BodyReadFailure { status, .. } => {
                assert_eq!(status, StatusCode::OK);
            }
            other => panic!("expected BodyReadFailure, got {:?}", other),
        }
        assert_eq!(accepts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_truncated_error_body_is_retried() {
        let (base_url, accepts) = raw_server(
            b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 100\r\n\r\nabc",
        )
        .await;

        let client = client_for(&base_url);
        let err = client
            .execute(&RequestSpec::get("/items").retry_attempts(3))
            .await
            .unwrap_err();

        match err {
            ExecutionError::RetriesExhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                match last {
                    AttemptFailure::BodyRead { status, .. } => {
                        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE)
                    }
                    other => panic!("expected body read failure, got {:?}", other),
                }
            }
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
        assert_eq!(accepts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_attempt_timeout_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client
            .execute(
                &RequestSpec::get("/slow")
                    .timeout(Duration::from_millis(50))
                    .retry_attempts(2),
            )
            .await
            .unwrap_err();

        match err {
            ExecutionError::RetriesExhausted { attempts, last } => {
                assert_eq!(attempts, 2);
                match last {
                    AttemptFailure::Transport(e) => assert!(e.is_timeout()),
                    other => panic!("expected transport timeout, got {:?}", other),
                }
            }
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_before_first_attempt() {
        let server = MockServer::start().await;
        let client = client_for(&server.uri());

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = client
            .execute_with_cancel(&RequestSpec::get("/items"), &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_during_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            client.execute_with_cancel(&RequestSpec::get("/slow"), &cancel),
        )
        .await
        .expect("cancellation should end the call promptly");
        assert!(result.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_during_backoff() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = RestClient::new(
            ClientConfig::builder(server.uri())
                .retry_policy(RetryPolicy::exponential(
                    Duration::from_secs(30),
                    Duration::from_secs(30),
                ))
                .build(),
        )
        .unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            client.execute_with_cancel(&RequestSpec::get("/items"), &cancel),
        )
        .await
        .expect("cancellation should interrupt the backoff");
        assert!(result.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_headers_and_query_propagate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = RestClient::new(
            ClientConfig::builder(format!("{}/", server.uri()))
                .token("s3cr3t", "X-API-Key")
                .default_header("X-Tenant", "acme")
                .user_agent("restful-test/1.0")
                .build(),
        )
        .unwrap();

        let response = client
            .execute(
                &RequestSpec::get("/users")
                    .query("limit", "10")
                    .header("x-tenant", "globex")
                    .header("Accept", "application/vnd.api+json"),
            )
            .await
            .unwrap();
        assert_eq!(response.request().method, Method::GET);
        assert_eq!(response.request().url.query(), Some("limit=10"));

        let requests = server.received_requests().await.unwrap();
        let headers = &requests[0].headers;
        assert_eq!(headers["x-api-key"], "s3cr3t");
        assert_eq!(headers["x-tenant"], "globex");
        assert_eq!(headers["accept"], "application/vnd.api+json");
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["user-agent"], "restful-test/1.0");
    }

    #[tokio::test]
    async fn test_invalid_per_call_header_fails_before_sending() {
        let server = MockServer::start().await;
        let client = client_for(&server.uri());

        let err = client
            .execute(&RequestSpec::get("/items").header("bad header", "x"))
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutionError::InvalidHeader { .. }));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
