//! Field names excluded from drift comparison.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Server-managed field names that never count as drift.
///
/// Identifiers, timestamps, versioning, audit fields, underscore-prefixed
/// metadata and hypermedia links. `metadata` is left out on purpose since
/// user configuration commonly carries it.
pub const DEFAULT_IGNORE_FIELDS: [&str; 28] = [
    "id",
    "created_at",
    "updated_at",
    "createdAt",
    "updatedAt",
    "modified_at",
    "modifiedAt",
    "last_modified",
    "lastModified",
    "timestamp",
    "etag",
    "version",
    "revision",
    "created_by",
    "updated_by",
    "modified_by",
    "owner_id",
    "_id",
    "_version",
    "_rev",
    "_etag",
    "_links",
    "_meta",
    "_created",
    "_updated",
    "links",
    "self",
    "meta",
];

/// A flat set of bare key names, matched at any depth.
///
/// Deserializing or collecting names always starts from the defaults. Use
/// [`IgnoreSet::empty`] to compare every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IgnoreSet {
    fields: BTreeSet<String>,
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self::defaults()
    }
}

impl IgnoreSet {
    /// The default server-managed fields.
    pub fn defaults() -> Self {
        Self {
            fields: DEFAULT_IGNORE_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// An empty set; nothing is ignored.
    pub fn empty() -> Self {
        Self {
            fields: BTreeSet::new(),
        }
    }

    /// The defaults plus user-supplied names.
    pub fn with_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::defaults();
        set.extend(fields);
        set
    }

    /// Add a field name.
    pub fn insert(&mut self, field: impl Into<String>) -> bool {
        self.fields.insert(field.into())
    }

    /// Check if a key is ignored.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains(key)
    }

    /// Number of ignored names.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over ignored names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}

impl<S: Into<String>> Extend<S> for IgnoreSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.fields.extend(iter.into_iter().map(Into::into));
    }
}

impl<S: Into<String>> FromIterator<S> for IgnoreSet {
    /// Collects the given names on top of the defaults.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::with_fields(iter)
    }
}

impl<'de> Deserialize<'de> for IgnoreSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Vec::<String>::deserialize(deserializer)?;
        Ok(Self::with_fields(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_server_metadata() {
        let set = IgnoreSet::defaults();
        for field in ["id", "createdAt", "etag", "_links", "owner_id", "self"] {
            assert!(set.contains(field), "{field} should be ignored");
        }
        assert!(!set.contains("metadata"));
        assert!(!set.contains("name"));
        assert_eq!(set.len(), DEFAULT_IGNORE_FIELDS.len());
    }

    #[test]
    fn test_user_fields_are_added_to_defaults() {
        let set = IgnoreSet::with_fields(["status", "id"]);
        assert!(set.contains("status"));
        assert!(set.contains("updated_at"));
        assert_eq!(set.len(), DEFAULT_IGNORE_FIELDS.len() + 1);
    }

    #[test]
    fn test_collect_keeps_defaults() {
        let set: IgnoreSet = ["status"].into_iter().collect();
        assert!(set.contains("status"));
        assert!(set.contains("id"));
        assert!(IgnoreSet::empty().is_empty());
    }

    #[test]
    fn test_serializes_as_list() {
        let mut set = IgnoreSet::empty();
        set.insert("b");
        set.insert("a");
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["a","b"]"#);
    }

    #[test]
    fn test_deserialized_names_merge_with_defaults() {
        let set: IgnoreSet = serde_json::from_str(r#"["status"]"#).unwrap();
        assert!(set.contains("status"));
        assert!(set.contains("etag"));
        assert_eq!(set.len(), DEFAULT_IGNORE_FIELDS.len() + 1);

        let empty: IgnoreSet = serde_json::from_str("[]").unwrap();
        assert_eq!(empty, IgnoreSet::defaults());
    }
}
