//! Drift policy and body-level drift checks.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::compare::{DriftMode, detect_drift_with_mode};
use crate::ignore::IgnoreSet;
use crate::report::{DriftReport, FieldDiff, ROOT_PATH};

/// How drift is checked for a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftPolicy {
    /// Run drift checks at all.
    pub enabled: bool,
    /// Field names never compared.
    pub ignore: IgnoreSet,
    /// Comparison direction.
    pub mode: DriftMode,
}

impl Default for DriftPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            ignore: IgnoreSet::defaults(),
            mode: DriftMode::ExpectedOnly,
        }
    }
}

impl DriftPolicy {
    /// A policy that never reports drift.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Ignore these fields on top of the current set.
    pub fn ignore_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(fields);
        self
    }

    /// Report observed-only fields as well.
    pub fn strict(mut self) -> Self {
        self.mode = DriftMode::Strict;
        self
    }

    /// Compare two raw bodies under this policy.
    pub fn check(&self, expected_body: &str, observed_body: &str) -> DriftReport {
        detect_body_drift(expected_body, observed_body, self)
    }
}

/// Compare raw expected and observed bodies.
///
/// When the expected body is a JSON object the comparison is structural.
/// Otherwise the two bodies are compared as strings. An object expected
/// against a non-object observed body is reported as one change at the root.
pub fn detect_body_drift(expected_body: &str, observed_body: &str, policy: &DriftPolicy) -> DriftReport {
    if !policy.enabled {
        return DriftReport::clean();
    }

    let expected = match serde_json::from_str::<Value>(expected_body) {
        Ok(Value::Object(map)) => map,
        _ => {
            debug!("expected body is not a JSON object, comparing raw strings");
            if expected_body == observed_body {
                return DriftReport::clean();
            }
            return DriftReport {
                diffs: vec![FieldDiff::changed(
                    ROOT_PATH.to_string(),
                    &Value::String(expected_body.to_string()),
                    &Value::String(observed_body.to_string()),
                )],
            };
        }
    };

    let report = match serde_json::from_str::<Value>(observed_body) {
        Ok(Value::Object(observed)) => {
            detect_drift_with_mode(&expected, &observed, &policy.ignore, policy.mode)
        }
        Ok(other) => root_change(expected, other),
        Err(_) => root_change(expected, Value::String(observed_body.to_string())),
    };

    debug!(
        drift = report.has_drift(),
        fields = report.len(),
        "drift check complete"
    );
    report
}

fn root_change(expected: serde_json::Map<String, Value>, observed: Value) -> DriftReport {
    DriftReport {
        diffs: vec![FieldDiff::changed(
            ROOT_PATH.to_string(),
            &Value::Object(expected),
            &observed,
        )],
    }
}
