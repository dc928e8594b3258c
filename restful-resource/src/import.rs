//! Import identifier parsing.

use crate::error::{ResourceError, Result};

/// Endpoint and name recovered from an import identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportId {
    /// Collection endpoint, always with a leading slash.
    pub endpoint: String,
    /// Resource name within the collection.
    pub name: String,
}

/// Parse an `endpoint/name` identifier, splitting on the last `/`.
pub fn parse_import_id(id: &str) -> Result<ImportId> {
    let invalid = || ResourceError::InvalidImportId(id.to_string());

    let trimmed = id.trim();
    let (endpoint, name) = trimmed.rsplit_once('/').ok_or_else(invalid)?;
    let endpoint = endpoint.trim_end_matches('/');
    if name.is_empty() || endpoint.trim_start_matches('/').is_empty() {
        return Err(invalid());
    }

    let endpoint = if endpoint.starts_with('/') {
        endpoint.to_string()
    } else {
        format!("/{}", endpoint)
    };

    Ok(ImportId {
        endpoint,
        name: name.to_string(),
    })
}
