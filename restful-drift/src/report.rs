//! Drift report types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Path used when the whole body is compared as one value.
pub const ROOT_PATH: &str = "$";

/// How a field differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    /// Expected field is absent from the observed data.
    Missing,
    /// Field is present on both sides with different values.
    Changed,
    /// Observed field that was never expected. Strict mode only.
    Unexpected,
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing"),
            Self::Changed => write!(f, "changed"),
            Self::Unexpected => write!(f, "unexpected"),
        }
    }
}

/// A single drifted field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDiff {
    /// Dotted path with index suffixes, e.g. `spec.ports[0].name`.
    pub path: String,
    /// Kind of difference.
    pub kind: DiffKind,
    /// Expected value, absent for [`DiffKind::Unexpected`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    /// Observed value, absent for [`DiffKind::Missing`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<Value>,
}

impl FieldDiff {
    pub(crate) fn missing(path: String, expected: &Value) -> Self {
        Self {
            path,
            kind: DiffKind::Missing,
            expected: Some(expected.clone()),
            observed: None,
        }
    }

    pub(crate) fn changed(path: String, expected: &Value, observed: &Value) -> Self {
        Self {
            path,
            kind: DiffKind::Changed,
            expected: Some(expected.clone()),
            observed: Some(observed.clone()),
        }
    }

    pub(crate) fn unexpected(path: String, observed: &Value) -> Self {
        Self {
            path,
            kind: DiffKind::Unexpected,
            expected: None,
            observed: Some(observed.clone()),
        }
    }
}

impl fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.expected, &self.observed) {
            (Some(expected), Some(observed)) => {
                write!(f, "{} {}: {} -> {}", self.path, self.kind, expected, observed)
            }
            (Some(value), None) | (None, Some(value)) => {
                write!(f, "{} {}: {}", self.path, self.kind, value)
            }
            (None, None) => write!(f, "{} {}", self.path, self.kind),
        }
    }
}

/// Outcome of a drift check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    /// Every drifted field, in walk order.
    pub diffs: Vec<FieldDiff>,
}

impl DriftReport {
    /// A report with no drift.
    pub fn clean() -> Self {
        Self::default()
    }

    /// Check if any drift was found.
    pub fn has_drift(&self) -> bool {
        !self.diffs.is_empty()
    }

    /// Number of drifted fields.
    pub fn len(&self) -> usize {
        self.diffs.len()
    }

    /// Check if the report is empty.
    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }

    /// Paths of all drifted fields.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.diffs.iter().map(|d| d.path.as_str())
    }

    /// Find the diff for a path.
    pub fn get(&self, path: &str) -> Option<&FieldDiff> {
        self.diffs.iter().find(|d| d.path == path)
    }
}

impl fmt::Display for DriftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.diffs.is_empty() {
            return write!(f, "no drift");
        }
        for (i, diff) in self.diffs.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", diff)?;
        }
        Ok(())
    }
}
