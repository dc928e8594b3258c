//! Recursive comparison of expected and observed JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::ignore::IgnoreSet;
use crate::report::{DriftReport, FieldDiff};

/// Which side of the comparison drives the walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftMode {
    /// Only expected keys are checked; extra observed keys are fine.
    #[default]
    ExpectedOnly,
    /// Observed keys that were never expected are reported too.
    Strict,
}

/// Compare `expected` against `observed`, reporting expected keys that are
/// missing or changed.
pub fn detect_drift(
    expected: &Map<String, Value>,
    observed: &Map<String, Value>,
    ignore: &IgnoreSet,
) -> DriftReport {
    detect_drift_with_mode(expected, observed, ignore, DriftMode::ExpectedOnly)
}

/// Compare `expected` against `observed` in the given mode.
pub fn detect_drift_with_mode(
    expected: &Map<String, Value>,
    observed: &Map<String, Value>,
    ignore: &IgnoreSet,
    mode: DriftMode,
) -> DriftReport {
    let mut walker = Walker {
        ignore,
        mode,
        diffs: Vec::new(),
    };
    walker.objects(expected, observed, "");
    DriftReport {
        diffs: walker.diffs,
    }
}

/// Deep equality with integer and float representations of the same number
/// considered equal.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|other| values_equal(v, other)))
        }
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        _ => false,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (as_integer(a), as_integer(b)) {
        (Some(x), Some(y)) => x == y,
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

struct Walker<'a> {
    ignore: &'a IgnoreSet,
    mode: DriftMode,
    diffs: Vec<FieldDiff>,
}

impl Walker<'_> {
    fn objects(&mut self, expected: &Map<String, Value>, observed: &Map<String, Value>, prefix: &str) {
        for (key, expected_value) in expected {
            if self.ignore.contains(key) {
                continue;
            }
            let path = join_key(prefix, key);
            match observed.get(key) {
                Some(observed_value) => self.values(expected_value, observed_value, path),
                None => self.diffs.push(FieldDiff::missing(path, expected_value)),
            }
        }

        if self.mode == DriftMode::Strict {
            for (key, observed_value) in observed {
                if expected.contains_key(key) || self.ignore.contains(key) {
                    continue;
                }
                self.diffs
                    .push(FieldDiff::unexpected(join_key(prefix, key), observed_value));
            }
        }
    }

    fn values(&mut self, expected: &Value, observed: &Value, path: String) {
        match (expected, observed) {
            (Value::Object(e), Value::Object(o)) => self.objects(e, o, &path),
            (Value::Array(e), Value::Array(o)) if e.len() == o.len() => {
                for (i, (e, o)) in e.iter().zip(o).enumerate() {
                    self.values(e, o, format!("{}[{}]", path, i));
                }
            }
            _ => {
                if !values_equal(expected, observed) {
                    self.diffs.push(FieldDiff::changed(path, expected, observed));
                }
            }
        }
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}
