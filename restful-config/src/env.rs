// Environment variable loading

use crate::{Result, SettingsError};
use std::collections::HashMap;
use std::env;
use std::path::Path;

/// Prefix shared by every restful environment variable.
pub const ENV_PREFIX: &str = "RESTFUL";

/// Environment variable loader
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Loader for `RESTFUL_*` variables
    pub fn restful() -> Self {
        Self::new(Some(ENV_PREFIX.to_string()))
    }

    /// Load matching variables from the process environment
    pub fn load(&self) -> HashMap<String, String> {
        self.load_from(env::vars())
    }

    /// Load matching variables from an explicit list of pairs
    ///
    /// Keys are lowercased with the prefix and its separator removed.
    pub fn load_from<I>(&self, vars: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = HashMap::new();

        for (key, value) in vars {
            match &self.prefix {
                Some(prefix) => {
                    if let Some(rest) = key.strip_prefix(prefix.as_str())
                        && let Some(name) = rest.strip_prefix('_')
                        && !name.is_empty()
                    {
                        config.insert(name.to_lowercase(), value);
                    }
                }
                None => {
                    config.insert(key.to_lowercase(), value);
                }
            }
        }

        config
    }

    /// Load matching variables from a `.env` file without touching the
    /// process environment
    pub fn load_dotenv(&self, path: impl AsRef<Path>) -> Result<HashMap<String, String>> {
        let path = path.as_ref();
        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            SettingsError::LoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let pairs = iter
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| SettingsError::ParseError(format!("dotenv parse error: {}", e)))?;

        Ok(self.load_from(pairs))
    }

    /// Load a specific environment variable
    pub fn load_var(&self, key: &str) -> Option<String> {
        env::var(self.full_key(key)).ok()
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|| default.to_string())
    }

    /// Full variable name for a key, e.g. `api_url` -> `RESTFUL_API_URL`
    pub fn full_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::restful()
    }
}
