//! Resource adapter errors.

use restful_client::{ExecutionError, StatusCode};
use thiserror::Error;

use crate::method::Operation;

/// Result type for resource operations.
pub type Result<T> = std::result::Result<T, ResourceError>;

/// Errors raised by the resource and data adapters.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// An explicit method override is not allowed for the operation.
    #[error("method '{method}' is not valid for {operation}; expected one of {allowed}")]
    InvalidMethod {
        /// Operation being resolved.
        operation: Operation,
        /// Rejected method.
        method: String,
        /// Allowed methods, comma separated.
        allowed: String,
    },

    /// The import identifier is not `endpoint/name`.
    #[error("invalid import id '{0}': expected 'endpoint/name'")]
    InvalidImportId(String),

    /// The API answered with a status the operation does not accept.
    #[error("{operation} returned unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// Operation that failed.
        operation: Operation,
        /// Status received.
        status: StatusCode,
        /// Response body, lossily decoded.
        body: String,
    },

    /// The request could not be executed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl ResourceError {
    /// Status code carried by the error, if any.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Execution(e) => e.status_code(),
            _ => None,
        }
    }
}
