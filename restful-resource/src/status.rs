//! Which response statuses each operation accepts.

use std::collections::BTreeMap;

use restful_client::StatusCode;
use serde::{Deserialize, Serialize};

use crate::method::Operation;

/// How a response status is interpreted for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    /// The operation succeeded.
    Success,
    /// The resource does not exist (read or delete of a removed resource).
    Gone,
    /// The status is not acceptable.
    Unexpected,
}

/// Accepted, rejected and retried statuses per operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusPolicy {
    /// Statuses treated as success, per operation.
    pub expected: BTreeMap<Operation, Vec<u16>>,
    /// Statuses that always fail, even if listed as expected.
    pub fail_on: Vec<u16>,
    /// Statuses retried by the executor on top of its defaults.
    pub retry_on: Vec<u16>,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        let expected = BTreeMap::from([
            (Operation::Create, vec![200, 201, 202]),
            (Operation::Read, vec![200]),
            (Operation::Update, vec![200, 201, 202, 204]),
            (Operation::Delete, vec![200, 202, 204]),
        ]);
        Self {
            expected,
            fail_on: Vec::new(),
            retry_on: Vec::new(),
        }
    }
}

impl StatusPolicy {
    /// Replace the expected statuses of one operation.
    pub fn expect(mut self, operation: Operation, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.expected
            .insert(operation, statuses.into_iter().collect());
        self
    }

    /// Always fail on these statuses.
    pub fn fail_on(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.fail_on.extend(statuses);
        self
    }

    /// Retry on these statuses.
    pub fn retry_on(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.retry_on.extend(statuses);
        self
    }

    /// Statuses accepted for an operation.
    pub fn expected_for(&self, operation: Operation) -> Option<&[u16]> {
        self.expected.get(&operation).map(Vec::as_slice)
    }

    /// Interpret a status for an operation.
    ///
    /// An operation with no expected statuses accepts any 2xx.
    pub fn evaluate(&self, operation: Operation, status: StatusCode) -> StatusOutcome {
        let code = status.as_u16();
        if self.fail_on.contains(&code) {
            return StatusOutcome::Unexpected;
        }

        let accepted = match self.expected_for(operation) {
            Some(codes) if !codes.is_empty() => codes.contains(&code),
            _ => status.is_success(),
        };
        if accepted {
            return StatusOutcome::Success;
        }

        let removed = status == StatusCode::NOT_FOUND || status == StatusCode::GONE;
        match operation {
            Operation::Read | Operation::Delete if removed => StatusOutcome::Gone,
            _ => StatusOutcome::Unexpected,
        }
    }
}
