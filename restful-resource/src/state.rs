//! Persisted resource state.

use chrono::{DateTime, Utc};
use restful_drift::DriftReport;
use serde::{Deserialize, Serialize};

use crate::projector::Projection;

/// Per-operation method overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodOverrides {
    /// Method for create.
    pub create: Option<String>,
    /// Method for read.
    pub read: Option<String>,
    /// Method for update.
    pub update: Option<String>,
    /// Method for delete.
    pub delete: Option<String>,
}

/// The last response seen for a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    /// HTTP status.
    pub status: u16,
    /// Raw body, lossily decoded.
    pub body: String,
    /// Projected top-level fields.
    pub projection: Projection,
}

/// Everything known about one managed resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceState {
    /// Resource identifier.
    pub id: Option<String>,
    /// Collection endpoint, relative to the API base URL.
    pub endpoint: String,
    /// Resource name within the collection.
    pub name: String,
    /// Per-operation method overrides.
    pub methods: MethodOverrides,
    /// Shared method applied to every operation where it is valid.
    pub method: Option<String>,
    /// Body sent on create, and on update when no update body is set.
    pub body: Option<String>,
    /// Body sent on update.
    pub update_body: Option<String>,
    /// Body sent on delete.
    pub destroy_body: Option<String>,
    /// Last response received.
    pub last_response: Option<ResponseSnapshot>,
    /// When the resource was created.
    pub created_at: Option<DateTime<Utc>>,
    /// When the resource was last created, updated or refreshed.
    pub updated_at: Option<DateTime<Utc>>,
    /// Drift found on the last read.
    pub drift: Option<DriftReport>,
}

impl ResourceState {
    /// Create a new state for a named resource under an endpoint.
    pub fn new(endpoint: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the create body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the update body.
    pub fn with_update_body(mut self, body: impl Into<String>) -> Self {
        self.update_body = Some(body.into());
        self
    }

    /// Set the delete body.
    pub fn with_destroy_body(mut self, body: impl Into<String>) -> Self {
        self.destroy_body = Some(body.into());
        self
    }

    /// Set the shared method.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set the per-operation overrides.
    pub fn with_methods(mut self, methods: MethodOverrides) -> Self {
        self.methods = methods;
        self
    }

    /// Path of the individual resource: `endpoint/name`.
    pub fn resource_path(&self) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), self.name)
    }

    /// Identifier used when the API returns none.
    pub fn fallback_id(&self) -> String {
        self.resource_path()
    }

    /// Check if the last read found drift.
    pub fn has_drift(&self) -> bool {
        self.drift.as_ref().is_some_and(DriftReport::has_drift)
    }

    /// Body used for the create request.
    pub(crate) fn create_body(&self) -> &str {
        non_empty_body(self.body.as_deref())
    }

    /// Body used for the update request.
    pub(crate) fn effective_update_body(&self) -> &str {
        match self.update_body.as_deref() {
            Some(body) if !body.trim().is_empty() => body,
            _ => self.create_body(),
        }
    }

    /// Body used for the delete request.
    pub(crate) fn delete_body(&self) -> &str {
        non_empty_body(self.destroy_body.as_deref())
    }
}

fn non_empty_body(body: Option<&str>) -> &str {
    match body {
        Some(body) if !body.trim().is_empty() => body,
        _ => "{}",
    }
}
