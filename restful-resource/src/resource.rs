//! Resource lifecycle adapter: create, read, update, delete and import.

use std::time::Duration;

use chrono::Utc;
use restful_client::{CancellationToken, Method, RequestSpec, Response, RestClient};
use restful_drift::DriftPolicy;
use tracing::{debug, trace, warn};

use crate::error::{ResourceError, Result};
use crate::import::parse_import_id;
use crate::method::{Operation, resolve_method};
use crate::projector::project;
use crate::state::{ResourceState, ResponseSnapshot};
use crate::status::{StatusOutcome, StatusPolicy};

/// Manages REST resources through a shared client.
#[derive(Debug, Clone)]
pub struct RestResource {
    client: RestClient,
    status: StatusPolicy,
    drift: DriftPolicy,
    timeout: Option<Duration>,
    retry_attempts: Option<u32>,
    cancel: CancellationToken,
}

impl RestResource {
    /// Create an adapter with default status and drift policies.
    pub fn new(client: RestClient) -> Self {
        Self {
            client,
            status: StatusPolicy::default(),
            drift: DriftPolicy::default(),
            timeout: None,
            retry_attempts: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Set the status policy.
    pub fn status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status = policy;
        self
    }

    /// Set the drift policy.
    pub fn drift_policy(mut self, policy: DriftPolicy) -> Self {
        self.drift = policy;
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

    /// Abandon in-flight calls when `cancel` fires.
    pub fn cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Get the underlying client.
    pub fn client(&self) -> &RestClient {
        &self.client
    }

    /// Create the resource by sending the body to its endpoint.
    ///
    /// The identifier is taken from the response `id`, falling back to
    /// `endpoint/name`.
    pub async fn create(&self, desired: &ResourceState) -> Result<ResourceState> {
        let method = self.method_for(Operation::Create, desired)?;
        let spec = self
            .request(method, &desired.endpoint)
            .body(desired.create_body().to_string());
        let (response, _) = self.send(Operation::Create, &spec).await?;

        let mut state = desired.clone();
        let snapshot = snapshot(&response);
        state.id = Some(
            snapshot
                .projection
                .identifier
                .clone()
                .unwrap_or_else(|| desired.fallback_id()),
        );
        let now = Utc::now();
        state.created_at = Some(now);
        state.updated_at = Some(now);
        state.last_response = Some(snapshot);
        state.drift = None;

        trace!(
            endpoint = %state.endpoint,
            id = state.id.as_deref().unwrap_or_default(),
            status = response.status().as_u16(),
            "created REST resource"
        );
        Ok(state)
    }

    /// Refresh the resource from the API.
    ///
    /// Returns `None` when the API reports the resource gone. Drift against
    /// the configured body is recorded and logged but never fails the read.
    pub async fn read(&self, current: &ResourceState) -> Result<Option<ResourceState>> {
        let method = self.method_for(Operation::Read, current)?;
        let spec = self.request(method, &current.resource_path());
        let (response, outcome) = self.send(Operation::Read, &spec).await?;
        if outcome == StatusOutcome::Gone {
            debug!(path = %current.resource_path(), "REST resource is gone");
            return Ok(None);
        }

        let mut state = current.clone();
        let snapshot = snapshot(&response);

        if let Some(expected) = current.body.as_deref().filter(|b| !b.trim().is_empty()) {
            let report = self.drift.check(expected, &snapshot.body);
            if report.has_drift() {
                warn!(
                    path = %current.resource_path(),
                    fields = report.len(),
                    drift = %report,
                    "configuration drift detected"
                );
            }
            state.drift = Some(report);
        }

        if state.id.is_none() {
            state.id = snapshot.projection.identifier.clone();
        }
        state.updated_at = Some(Utc::now());
        state.last_response = Some(snapshot);

        trace!(
            path = %state.resource_path(),
            status = response.status().as_u16(),
            "read REST resource"
        );
        Ok(Some(state))
    }

    /// Update the resource in place.
    pub async fn update(&self, desired: &ResourceState) -> Result<ResourceState> {
        let method = self.method_for(Operation::Update, desired)?;
        let spec = self
            .request(method, &desired.resource_path())
            .body(desired.effective_update_body().to_string());
        let (response, _) = self.send(Operation::Update, &spec).await?;

        let mut state = desired.clone();
        let snapshot = snapshot(&response);
        if state.id.is_none() {
            state.id = Some(
                snapshot
                    .projection
                    .identifier
                    .clone()
                    .unwrap_or_else(|| desired.fallback_id()),
            );
        }
        state.updated_at = Some(Utc::now());
        state.last_response = Some(snapshot);
        state.drift = None;

        trace!(
            id = state.id.as_deref().unwrap_or_default(),
            status = response.status().as_u16(),
            "updated REST resource"
        );
        Ok(state)
    }

    /// Delete the resource. A resource that is already gone counts as deleted.
    pub async fn delete(&self, current: &ResourceState) -> Result<()> {
        let method = self.method_for(Operation::Delete, current)?;
        let spec = self
            .request(method, &current.resource_path())
            .body(current.delete_body().to_string());
        let (response, outcome) = self.send(Operation::Delete, &spec).await?;

        trace!(
            name = %current.name,
            status = response.status().as_u16(),
            already_gone = outcome == StatusOutcome::Gone,
            "deleted REST resource"
        );
        Ok(())
    }

    /// Adopt an existing resource from an `endpoint/name` identifier.
    ///
    /// Returns `None` when the resource does not exist.
    pub async fn import(&self, id: &str) -> Result<Option<ResourceState>> {
        let parsed = parse_import_id(id)?;
        let mut state = ResourceState::new(parsed.endpoint, parsed.name);
        state.id = Some(id.to_string());

        let Some(mut state) = self.read(&state).await? else {
            return Ok(None);
        };
        state.created_at = state.updated_at;
        Ok(Some(state))
    }

    fn method_for(&self, operation: Operation, state: &ResourceState) -> Result<Method> {
        let explicit = match operation {
            Operation::Create => state.methods.create.as_deref(),
            Operation::Read => state.methods.read.as_deref(),
            Operation::Update => state.methods.update.as_deref(),
            Operation::Delete => state.methods.delete.as_deref(),
        };
        resolve_method(operation, explicit, state.method.as_deref())
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestSpec {
        let mut spec =
            RequestSpec::new(method, endpoint).retry_on_status(self.status.retry_on.iter().copied());
        if let Some(timeout) = self.timeout {
            spec = spec.timeout(timeout);
        }
        if let Some(attempts) = self.retry_attempts {
            spec = spec.retry_attempts(attempts);
        }
        spec
    }

    /// Execute and interpret the status. Unexpected statuses become errors.
    async fn send(
        &self,
        operation: Operation,
        spec: &RequestSpec,
    ) -> Result<(Response, StatusOutcome)> {
        debug!(
            operation = %operation,
            method = %spec.method,
            endpoint = %spec.endpoint,
            "executing resource operation"
        );
        let response = self.client.execute_with_cancel(spec, &self.cancel).await?;

        match self.status.evaluate(operation, response.status()) {
            StatusOutcome::Unexpected => Err(ResourceError::UnexpectedStatus {
                operation,
                status: response.status(),
                body: response.text(),
            }),
            outcome => Ok((response, outcome)),
        }
    }
}

fn snapshot(response: &Response) -> ResponseSnapshot {
    ResponseSnapshot {
        status: response.status().as_u16(),
        body: response.text(),
        projection: project(response.bytes()),
    }
}
