// Restful - generic REST resource management for Rust
//
// This library executes HTTP requests against arbitrary REST APIs with
// retry and backoff, authenticates with tokens, PEM or PKCS12 client
// certificates, flattens JSON responses and detects drift between the
// desired and the observed state of a resource.

// Re-export the client core
pub use restful_client::*;

// Re-export the companion crates
pub use restful_drift;
pub use restful_resource;

// Re-export optional crates
#[cfg(feature = "config")]
pub use restful_config;

#[cfg(feature = "log")]
pub use restful_log;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Auth,
        CancellationToken,
        ClientConfig,
        ConfigError,
        ExecutionError,
        Method,
        RequestSpec,
        Response,
        RestClient,
        RetryPolicy,
        StatusCode,
    };
    pub use restful_drift::{DriftPolicy, DriftReport, IgnoreSet, detect_drift};
    pub use restful_resource::{
        DataRequest, Operation, ResourceError, ResourceState, RestResource, StatusPolicy, fetch,
        project,
    };

    #[cfg(feature = "config")]
    pub use restful_config::{ProviderSettings, SettingsError};
}
