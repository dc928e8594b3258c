//! Read-only data adapter: one request, projected result.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use restful_client::{Method, RequestSpec, RestClient};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ResourceError, Result};
use crate::method::Operation;
use crate::projector::project;

/// A one-shot data request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataRequest {
    /// Endpoint relative to the API base URL.
    pub endpoint: String,
    /// HTTP method, `GET` when unset.
    pub method: Option<String>,
    /// Extra request headers.
    pub headers: HashMap<String, String>,
    /// Query parameters.
    pub query: HashMap<String, String>,
    /// Body, only sent for POST, PUT and PATCH.
    pub body: Option<String>,
    /// Per-attempt timeout in seconds.
    pub timeout: Option<u64>,
    /// Attempt budget.
    pub retry_attempts: Option<u32>,
}

impl DataRequest {
    /// GET request for an endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }
}

/// What a data request returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataResult {
    /// Resolved request URL, used as the identifier.
    pub id: String,
    /// HTTP status.
    pub status: u16,
    /// Raw response body.
    pub body: String,
    /// Projected top-level fields.
    pub fields: BTreeMap<String, String>,
}

/// Run a data request. Any status is returned as-is.
pub async fn fetch(client: &RestClient, request: &DataRequest) -> Result<DataResult> {
    let method = match request.method.as_deref().map(str::trim) {
        None | Some("") => Method::GET,
        Some(raw) => Method::from_bytes(raw.to_ascii_uppercase().as_bytes()).map_err(|_| {
            ResourceError::InvalidMethod {
                operation: Operation::Read,
                method: raw.to_string(),
                allowed: "any HTTP method".to_string(),
            }
        })?,
    };

    let mut spec = RequestSpec::new(method.clone(), request.endpoint.clone())
        .headers(request.headers.clone())
        .queries(request.query.clone());
    if let Some(body) = &request.body
        && sends_body(&method)
    {
        spec = spec.body(body.clone());
    }
    if let Some(secs) = request.timeout.filter(|s| *s > 0) {
        spec = spec.timeout(Duration::from_secs(secs));
    }
    if let Some(attempts) = request.retry_attempts {
        spec = spec.retry_attempts(attempts);
    }

    let response = client.execute(&spec).await?;
    let projection = project(response.bytes());

    trace!(
        url = %response.request().url,
        status = response.status().as_u16(),
        "read REST data source"
    );

    Ok(DataResult {
        id: response.request().url.to_string(),
        status: response.status().as_u16(),
        body: response.text(),
        fields: projection.fields,
    })
}

fn sends_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}
