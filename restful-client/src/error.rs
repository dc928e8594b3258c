//! REST client error types.

use bytes::Bytes;
use http::StatusCode;
use thiserror::Error;

/// Result type for request execution.
pub type Result<T> = std::result::Result<T, ExecutionError>;

/// Errors raised while assembling a client, before any request is sent.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No base URL was configured.
    #[error("base URL is required")]
    MissingBaseUrl,

    /// The base URL could not be parsed or has no scheme.
    #[error("invalid base URL '{url}': {reason}")]
    MalformedBaseUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Inline PEM certificate or key could not be parsed.
    #[error("failed to parse client certificate and key: {0}")]
    InvalidCertificate(String),

    /// Certificate, key or PKCS12 file could not be read or parsed.
    #[error("failed to load client certificate file '{path}': {reason}")]
    FileReadFailure {
        /// Path of the offending file.
        path: String,
        /// Underlying failure.
        reason: String,
    },

    /// PKCS12 bundle could not be decoded.
    #[error("failed to decode PKCS12 bundle: {0}")]
    InvalidPkcs12(String),

    /// A default header name or value is not valid HTTP.
    #[error("invalid default header '{name}': {reason}")]
    InvalidHeader {
        /// Header name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The underlying connection pool could not be built.
    #[error("failed to build HTTP transport: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Errors raised when composing a request URL.
#[derive(Debug, Error)]
pub enum UrlError {
    /// The joined base URL and endpoint do not form a valid URL.
    #[error("malformed URL '{url}': {source}")]
    Malformed {
        /// The string that failed to parse.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
}

/// The failure observed on the final attempt of an exhausted call.
#[derive(Debug, Error)]
pub enum AttemptFailure {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response arrived but its body could not be read.
    #[error("failed to read response body (status {status}): {source}")]
    BodyRead {
        /// Status line of the unreadable response.
        status: StatusCode,
        /// Read error.
        #[source]
        source: reqwest::Error,
    },

    /// The server kept answering with a retryable status.
    #[error("received retryable status code {status}")]
    Status {
        /// Last status received.
        status: StatusCode,
        /// Last body received.
        body: Bytes,
    },
}

/// Per-call execution errors.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The caller cancelled the call.
    #[error("request cancelled")]
    Cancelled,

    /// Every attempt failed; wraps the last failure.
    #[error("request failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Failure of the final attempt.
        #[source]
        last: AttemptFailure,
    },

    /// A 2xx response whose body could not be read. Never retried.
    #[error("failed to read response body (status {status}): {source}")]
    BodyReadFailure {
        /// Status of the response.
        status: StatusCode,
        /// Read error.
        #[source]
        source: reqwest::Error,
    },

    /// URL composition failed.
    #[error("failed to build URL: {0}")]
    Url(#[from] UrlError),

    /// A per-call header name or value is not valid HTTP.
    #[error("invalid header '{name}': {reason}")]
    InvalidHeader {
        /// Header name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ExecutionError {
    /// Check if the call was cancelled by the caller.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Last HTTP status seen, if the failure carried one.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::RetriesExhausted { last, .. } => match last {
                AttemptFailure::Status { status, .. } | AttemptFailure::BodyRead { status, .. } => {
                    Some(*status)
                }
                AttemptFailure::Transport(e) => e.status(),
            },
            Self::BodyReadFailure { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Body of the last retryable response, when retries ran out on a status.
    pub fn last_body(&self) -> Option<&Bytes> {
        match self {
            Self::RetriesExhausted {
                last: AttemptFailure::Status { body, .. },
                ..
            } => Some(body),
            _ => None,
        }
    }
}
