//! Drift detection for REST resources.
//!
//! Compares the configuration a caller expects against what the API returns,
//! skipping server-managed fields such as identifiers, timestamps and links.
//!
//! # Examples
//!
//! ```
//! use restful_drift::{DriftPolicy, IgnoreSet, detect_drift};
//! use serde_json::json;
//!
//! let expected = json!({"name": "John", "count": 1});
//! let observed = json!({"name": "John", "count": 1.0, "id": "123"});
//!
//! let report = detect_drift(
//!     expected.as_object().unwrap(),
//!     observed.as_object().unwrap(),
//!     &IgnoreSet::defaults(),
//! );
//! assert!(!report.has_drift());
//!
//! // Raw bodies go through a policy
//! let report = DriftPolicy::default().check(r#"{"name":"John"}"#, r#"{"name":"Jane"}"#);
//! assert_eq!(report.paths().collect::<Vec<_>>(), vec!["name"]);
//! ```

mod compare;
mod ignore;
mod policy;
mod report;

pub use compare::{DriftMode, detect_drift, detect_drift_with_mode, values_equal};
pub use ignore::{DEFAULT_IGNORE_FIELDS, IgnoreSet};
pub use policy::{DriftPolicy, detect_body_drift};
pub use report::{DiffKind, DriftReport, FieldDiff, ROOT_PATH};
