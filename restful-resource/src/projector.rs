//! Flattening of JSON response bodies into string maps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level fields of a JSON object body, rendered as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    /// Field name to string value.
    pub fields: BTreeMap<String, String>,
    /// Value of the top-level `id` field, when present.
    pub identifier: Option<String>,
}

impl Projection {
    /// Get a projected field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Check if nothing was projected.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Project a raw response body.
///
/// Bodies that are not a JSON object project to an empty map.
pub fn project(raw: &[u8]) -> Projection {
    let object = match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(object)) => object,
        _ => return Projection::default(),
    };

    let identifier = match object.get("id") {
        Some(Value::String(id)) => Some(id.clone()),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    };

    let fields = object
        .iter()
        .map(|(key, value)| (key.clone(), render_value(value)))
        .collect();

    Projection { fields, identifier }
}

/// Render one JSON value as a flat string.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (None, Some(u), _) => u.to_string(),
            // f64 Display is the shortest round-trip form and drops `.0`
            (None, None, Some(f)) => f.to_string(),
            (None, None, None) => n.to_string(),
        },
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
