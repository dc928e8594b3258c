//! REST client configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Default header carrying the API token.
pub const DEFAULT_TOKEN_HEADER: &str = "Authorization";

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of attempts per call.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Default idle connections kept in the pool.
pub const DEFAULT_MAX_IDLE_CONNS: usize = 100;

/// Default idle connection lifetime.
pub const DEFAULT_IDLE_CONN_TIMEOUT: Duration = Duration::from_secs(90);

/// How the client authenticates against the API.
///
/// Only one variant can be active at a time.
#[derive(Clone, Default)]
pub enum Auth {
    /// No credentials.
    #[default]
    None,
    /// Static token sent in a header on every request.
    Token {
        /// Token value, sent verbatim.
        token: String,
        /// Header name, usually `Authorization`.
        header: String,
    },
    /// Inline PEM client certificate and private key.
    Pem {
        /// PEM encoded certificate chain.
        cert: String,
        /// PEM encoded private key.
        key: String,
    },
    /// PEM client certificate and key read from disk.
    PemFiles {
        /// Path to the certificate chain.
        cert_path: PathBuf,
        /// Path to the private key.
        key_path: PathBuf,
    },
    /// Base64 encoded PKCS12 bundle.
    Pkcs12 {
        /// Base64 of the DER bundle.
        bundle: String,
        /// Bundle password.
        password: String,
    },
    /// PKCS12 bundle read from disk.
    Pkcs12File {
        /// Path to the bundle.
        path: PathBuf,
        /// Bundle password.
        password: String,
    },
}

impl Auth {
    /// Token authentication using the default `Authorization` header.
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token {
            token: token.into(),
            header: DEFAULT_TOKEN_HEADER.to_string(),
        }
    }

    /// Short name of the method, safe to log.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Token { .. } => "token",
            Self::Pem { .. } => "pem",
            Self::PemFiles { .. } => "pem_files",
            Self::Pkcs12 { .. } => "pkcs12",
            Self::Pkcs12File { .. } => "pkcs12_file",
        }
    }
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token { header, .. } => f
                .debug_struct("Token")
                .field("header", header)
                .field("token", &"<redacted>")
                .finish(),
            Self::PemFiles {
                cert_path,
                key_path,
            } => f
                .debug_struct("PemFiles")
                .field("cert_path", cert_path)
                .field("key_path", key_path)
                .finish(),
            Self::Pkcs12File { path, .. } => f
                .debug_struct("Pkcs12File")
                .field("path", path)
                .finish_non_exhaustive(),
            other => f.write_str(other.kind()),
        }
    }
}

/// REST client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint is resolved against.
    pub base_url: String,
    /// Authentication method.
    pub auth: Auth,
    /// Default per-attempt timeout.
    pub timeout: Duration,
    /// Skip server certificate verification.
    pub insecure: bool,
    /// Default number of attempts per call.
    pub retry_attempts: u32,
    /// Backoff and retryable-status policy.
    pub retry: RetryPolicy,
    /// Maximum idle connections kept per host.
    pub max_idle_conns: usize,
    /// How long an idle connection is kept.
    pub idle_conn_timeout: Duration,
    /// Do not reuse connections between requests.
    pub disable_keep_alives: bool,
    /// User agent string.
    pub user_agent: String,
    /// Extra headers added to every request.
    pub default_headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            auth: Auth::None,
            timeout: DEFAULT_TIMEOUT,
            insecure: false,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry: RetryPolicy::default(),
            max_idle_conns: DEFAULT_MAX_IDLE_CONNS,
            idle_conn_timeout: DEFAULT_IDLE_CONN_TIMEOUT,
            disable_keep_alives: false,
            user_agent: default_user_agent(),
            default_headers: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    pub fn builder(base_url: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: ClientConfig {
                base_url: base_url.into(),
                ..Default::default()
            },
        }
    }

    /// Replace zero values with defaults.
    pub(crate) fn normalized(mut self) -> Self {
        if self.timeout.is_zero() {
            self.timeout = DEFAULT_TIMEOUT;
        }
        if self.retry_attempts == 0 {
            self.retry_attempts = DEFAULT_RETRY_ATTEMPTS;
        }
        if self.max_idle_conns == 0 {
            self.max_idle_conns = DEFAULT_MAX_IDLE_CONNS;
        }
        if self.idle_conn_timeout.is_zero() {
            self.idle_conn_timeout = DEFAULT_IDLE_CONN_TIMEOUT;
        }
        if self.user_agent.is_empty() {
            self.user_agent = default_user_agent();
        }
        self
    }
}

fn default_user_agent() -> String {
    format!("restful-client/{}", env!("CARGO_PKG_VERSION"))
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the authentication method.
    pub fn auth(mut self, auth: Auth) -> Self {
        self.config.auth = auth;
        self
    }

    /// Authenticate with a token in the given header.
    pub fn token(mut self, token: impl Into<String>, header: impl Into<String>) -> Self {
        self.config.auth = Auth::Token {
            token: token.into(),
            header: header.into(),
        };
        self
    }

    /// Set the default per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Skip server certificate verification.
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.config.insecure = insecure;
        self
    }

    /// Set the default number of attempts.
    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.config.retry_attempts = attempts;
        self
    }

    /// Set the backoff policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    /// Set the maximum idle connections per host.
    pub fn max_idle_conns(mut self, max: usize) -> Self {
        self.config.max_idle_conns = max;
        self
    }

    /// Set the idle connection timeout.
    pub fn idle_conn_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_conn_timeout = timeout;
        self
    }

    /// Disable connection reuse.
    pub fn disable_keep_alives(mut self, disable: bool) -> Self {
        self.config.disable_keep_alives = disable;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Add a default header for all requests.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config
            .default_headers
            .push((name.into(), value.into()));
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
