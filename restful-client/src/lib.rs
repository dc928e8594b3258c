//! # Restful Client
//!
//! A REST client that retries with exponential backoff and authenticates
//! with a token, a PEM certificate or a PKCS12 bundle.
//!
//! ## Features
//!
//! - **Retry with Backoff**: retryable statuses and transient transport errors
//!   back off exponentially up to a cap
//! - **Client Certificates**: inline or file-based PEM, inline or file-based PKCS12
//! - **Cancellation**: every call can be abandoned through a `CancellationToken`
//! - **Connection Pooling**: one pooled transport per client, shared by clones
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use restful_client::{ClientConfig, RequestSpec, RestClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RestClient::new(
//!         ClientConfig::builder("https://api.example.com")
//!             .token("Bearer s3cr3t", "Authorization")
//!             .build(),
//!     )?;
//!
//!     let response = client
//!         .execute(&RequestSpec::get("/users").query("limit", "10"))
//!         .await?;
//!
//!     println!("Status: {}", response.status());
//!     Ok(())
//! }
//! ```
//!
//! ## Mutual TLS with PKCS12
//!
//! ```rust,no_run
//! use restful_client::{Auth, ClientConfig, RestClient};
//!
//! # fn main() -> Result<(), restful_client::ConfigError> {
//! let client = RestClient::new(
//!     ClientConfig::builder("https://api.internal.example.com")
//!         .auth(Auth::Pkcs12File {
//!             path: "/etc/restful/client.p12".into(),
//!             password: "changeit".into(),
//!         })
//!         .build(),
//! )?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod credentials;
mod error;
mod request;
mod response;
mod retry;

pub use client::RestClient;
pub use config::{
    Auth, ClientConfig, ClientConfigBuilder, DEFAULT_IDLE_CONN_TIMEOUT, DEFAULT_MAX_IDLE_CONNS,
    DEFAULT_RETRY_ATTEMPTS, DEFAULT_TIMEOUT, DEFAULT_TOKEN_HEADER,
};
pub use credentials::{ClientIdentity, PrivateKey, TlsMaterial, build_tls_config};
pub use error::{AttemptFailure, ConfigError, ExecutionError, Result, UrlError};
pub use request::{RequestSpec, build_url, merge_headers};
pub use response::{RequestInfo, Response};
pub use retry::{
    AttemptResult, DEFAULT_RETRYABLE_STATUS_CODES, RetryPolicy, Transition, is_retryable_error,
    is_retryable_status_code,
};

// Re-export common types
pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
pub use tokio_util::sync::CancellationToken;
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use restful_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::RestClient;
    pub use crate::config::{Auth, ClientConfig, ClientConfigBuilder};
    pub use crate::error::{ConfigError, ExecutionError, Result};
    pub use crate::request::RequestSpec;
    pub use crate::response::Response;
    pub use crate::retry::RetryPolicy;
    pub use http::{Method, StatusCode};
    pub use tokio_util::sync::CancellationToken;
}
