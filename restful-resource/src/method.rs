//! Per-operation HTTP method resolution.

use std::fmt;

use restful_client::Method;
use serde::{Deserialize, Serialize};

use crate::error::{ResourceError, Result};

/// A resource lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Create the resource.
    Create,
    /// Read the resource back.
    Read,
    /// Update the resource in place.
    Update,
    /// Delete the resource.
    Delete,
}

impl Operation {
    /// Method used when nothing is configured.
    pub fn default_method(self) -> Method {
        match self {
            Self::Create => Method::POST,
            Self::Read => Method::GET,
            Self::Update => Method::PUT,
            Self::Delete => Method::DELETE,
        }
    }

    /// Methods an override may choose from.
    pub fn allowed_methods(self) -> &'static [Method] {
        static CREATE: [Method; 3] = [Method::POST, Method::PUT, Method::PATCH];
        static READ: [Method; 2] = [Method::GET, Method::POST];
        static UPDATE: [Method; 3] = [Method::PUT, Method::PATCH, Method::POST];
        static DELETE: [Method; 3] = [Method::DELETE, Method::POST, Method::PUT];

        match self {
            Self::Create => &CREATE,
            Self::Read => &READ,
            Self::Update => &UPDATE,
            Self::Delete => &DELETE,
        }
    }

    fn allows(self, method: &Method) -> bool {
        self.allowed_methods().contains(method)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Read => write!(f, "read"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Pick the method for an operation.
///
/// Precedence: the explicit per-operation override, then the legacy shared
/// method when it is valid for this operation, then the default. An invalid
/// explicit override is an error; an invalid legacy value is skipped.
pub fn resolve_method(
    operation: Operation,
    explicit: Option<&str>,
    legacy: Option<&str>,
) -> Result<Method> {
    if let Some(raw) = non_empty(explicit) {
        return match parse_method(raw) {
            Some(method) if operation.allows(&method) => Ok(method),
            _ => Err(ResourceError::InvalidMethod {
                operation,
                method: raw.to_string(),
                allowed: operation
                    .allowed_methods()
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        };
    }

    if let Some(method) = non_empty(legacy).and_then(parse_method)
        && operation.allows(&method)
    {
        return Ok(method);
    }

    Ok(operation.default_method())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_method(raw: &str) -> Option<Method> {
    Method::from_bytes(raw.to_ascii_uppercase().as_bytes()).ok()
}
