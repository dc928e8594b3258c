// Settings validation

use crate::{Result, SettingsError};

/// Trait for validating settings
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Settings validator with rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is present and not blank
    pub fn not_empty(value: Option<&str>, field: &str) -> Result<()> {
        if value.is_none_or(|v| v.trim().is_empty()) {
            return Err(SettingsError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Validate URL scheme
    pub fn is_url(value: &str, field: &str) -> Result<()> {
        let value = value.trim();
        if !value.starts_with("http://") && !value.starts_with("https://") {
            return Err(SettingsError::ValidationError(format!(
                "{} must be a valid URL",
                field
            )));
        }
        Ok(())
    }

    /// Validate that two fields are either both set or both unset
    pub fn pair(
        first: (&'static str, bool),
        second: (&'static str, bool),
    ) -> Result<()> {
        match (first.1, second.1) {
            (true, false) => Err(SettingsError::IncompleteCertificatePair {
                present: first.0,
                missing: second.0,
            }),
            (false, true) => Err(SettingsError::IncompleteCertificatePair {
                present: second.0,
                missing: first.0,
            }),
            _ => Ok(()),
        }
    }

    /// Validate that at most one of the named options is set
    pub fn at_most_one(options: &[(&'static str, bool)]) -> Result<()> {
        let set: Vec<&'static str> = options
            .iter()
            .filter(|(_, present)| *present)
            .map(|(name, _)| *name)
            .collect();

        if set.len() > 1 {
            return Err(SettingsError::MultipleAuthMethods(set));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty_validation() {
        assert!(ConfigValidator::not_empty(Some("value"), "field").is_ok());
        assert!(ConfigValidator::not_empty(Some("  "), "field").is_err());
        assert!(ConfigValidator::not_empty(None, "field").is_err());
    }

    #[test]
    fn test_url_validation() {
        assert!(ConfigValidator::is_url("https://example.com", "field").is_ok());
        assert!(ConfigValidator::is_url("http://example.com", "field").is_ok());
        assert!(ConfigValidator::is_url("example.com", "field").is_err());
    }

    #[test]
    fn test_pair_validation() {
        assert!(ConfigValidator::pair(("cert", true), ("key", true)).is_ok());
        assert!(ConfigValidator::pair(("cert", false), ("key", false)).is_ok());

        let err = ConfigValidator::pair(("cert", false), ("key", true)).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::IncompleteCertificatePair {
                present: "key",
                missing: "cert"
            }
        ));
    }

    #[test]
    fn test_at_most_one_validation() {
        assert!(ConfigValidator::at_most_one(&[("a", false), ("b", false)]).is_ok());
        assert!(ConfigValidator::at_most_one(&[("a", true), ("b", false)]).is_ok());

        let err = ConfigValidator::at_most_one(&[("a", true), ("b", true), ("c", false)])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Only one authentication method may be set, found: a, b"
        );
    }
}
