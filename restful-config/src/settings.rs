//! Provider settings and their conversion into a client configuration.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use restful_client::{Auth, ClientConfig, DEFAULT_TOKEN_HEADER, RestClient};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::env::EnvLoader;
use crate::loader::{ConfigLoader, FileFormat};
use crate::validation::{ConfigValidator, Validate};
use crate::{Result, SettingsError};

/// Connection settings for a REST API.
///
/// Every field is optional so that sources can be layered with
/// [`merge`](Self::merge). Blank strings count as unset.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderSettings {
    /// Base URL of the API.
    pub api_url: Option<String>,
    /// Static API token.
    pub api_token: Option<String>,
    /// Header carrying the token, `Authorization` when unset.
    pub api_header: Option<String>,
    /// Inline PEM client certificate.
    pub client_cert: Option<String>,
    /// Inline PEM client key.
    pub client_key: Option<String>,
    /// Path to a PEM client certificate.
    pub client_cert_file: Option<PathBuf>,
    /// Path to a PEM client key.
    pub client_key_file: Option<PathBuf>,
    /// Base64 PKCS12 bundle.
    pub pkcs12_bundle: Option<String>,
    /// Path to a PKCS12 bundle.
    pub pkcs12_file: Option<PathBuf>,
    /// PKCS12 password.
    pub pkcs12_password: Option<String>,
    /// Request timeout in seconds.
    pub timeout: Option<u64>,
    /// Skip server certificate verification.
    pub insecure: Option<bool>,
    /// Attempts per call.
    pub retry_attempts: Option<u32>,
    /// Maximum idle connections per host.
    pub max_idle_conns: Option<usize>,
    /// Idle connection timeout in seconds.
    pub idle_conn_timeout: Option<u64>,
    /// Do not reuse connections.
    pub disable_keep_alives: Option<bool>,
    /// User agent string.
    pub user_agent: Option<String>,
    /// Extra headers sent on every request.
    pub headers: BTreeMap<String, String>,
}

impl ProviderSettings {
    /// Load settings from a JSON, TOML or `.env` file.
    ///
    /// `.env` files hold the same `RESTFUL_*` variables as the environment.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let loader = ConfigLoader::auto(path)?;
        let value = loader.load_file(path)?;
        debug!(path = %path.display(), format = ?loader.format(), "loaded settings file");

        match loader.format() {
            FileFormat::Env => Self::from_env_vars(string_pairs(value)),
            FileFormat::Json | FileFormat::Toml => Self::from_value(value),
        }
    }

    /// Deserialize settings from a JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| SettingsError::ParseError(format!("invalid settings: {}", e)))
    }

    /// Read `RESTFUL_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_map(&EnvLoader::restful().load())
    }

    /// Read `RESTFUL_*` variables from explicit pairs.
    pub fn from_env_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self::from_map(&EnvLoader::restful().load_from(vars))
    }

    /// Read `RESTFUL_*` variables from a `.env` file.
    pub fn from_dotenv(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_map(&EnvLoader::restful().load_dotenv(path)?)
    }

    /// Load a settings file, if any, overlaid with the process environment,
    /// then validate the result.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let settings = base.merge(Self::from_env()?);
        settings.validate()?;
        Ok(settings)
    }

    fn from_map(vars: &HashMap<String, String>) -> Result<Self> {
        let mut settings = Self::default();

        for (key, value) in vars {
            let value = value.clone();
            match key.as_str() {
                "api_url" => settings.api_url = Some(value),
                "api_token" => settings.api_token = Some(value),
                "api_header" => settings.api_header = Some(value),
                "client_cert" => settings.client_cert = Some(value),
                "client_key" => settings.client_key = Some(value),
                "client_cert_file" => settings.client_cert_file = Some(value.into()),
                "client_key_file" => settings.client_key_file = Some(value.into()),
                "pkcs12_bundle" => settings.pkcs12_bundle = Some(value),
                "pkcs12_file" => settings.pkcs12_file = Some(value.into()),
                "pkcs12_password" => settings.pkcs12_password = Some(value),
                "timeout" => settings.timeout = Some(parse_number(key, &value)?),
                "insecure" => settings.insecure = Some(parse_bool(key, &value)?),
                "retry_attempts" => settings.retry_attempts = Some(parse_number(key, &value)?),
                "max_idle_conns" => settings.max_idle_conns = Some(parse_number(key, &value)?),
                "idle_conn_timeout" => {
                    settings.idle_conn_timeout = Some(parse_number(key, &value)?)
                }
                "disable_keep_alives" => {
                    settings.disable_keep_alives = Some(parse_bool(key, &value)?)
                }
                "user_agent" => settings.user_agent = Some(value),
                "headers" => settings.headers = parse_headers(key, &value)?,
                _ => trace!(key = %key, "ignoring unrelated variable"),
            }
        }

        Ok(settings)
    }

    /// Overlay `other` on top of `self`. Fields set in `other` win and
    /// headers are merged.
    pub fn merge(mut self, other: Self) -> Self {
        fn overlay<T>(base: &mut Option<T>, top: Option<T>) {
            if top.is_some() {
                *base = top;
            }
        }

        overlay(&mut self.api_url, other.api_url);
        overlay(&mut self.api_token, other.api_token);
        overlay(&mut self.api_header, other.api_header);
        overlay(&mut self.client_cert, other.client_cert);
        overlay(&mut self.client_key, other.client_key);
        overlay(&mut self.client_cert_file, other.client_cert_file);
        overlay(&mut self.client_key_file, other.client_key_file);
        overlay(&mut self.pkcs12_bundle, other.pkcs12_bundle);
        overlay(&mut self.pkcs12_file, other.pkcs12_file);
        overlay(&mut self.pkcs12_password, other.pkcs12_password);
        overlay(&mut self.timeout, other.timeout);
        overlay(&mut self.insecure, other.insecure);
        overlay(&mut self.retry_attempts, other.retry_attempts);
        overlay(&mut self.max_idle_conns, other.max_idle_conns);
        overlay(&mut self.idle_conn_timeout, other.idle_conn_timeout);
        overlay(&mut self.disable_keep_alives, other.disable_keep_alives);
        overlay(&mut self.user_agent, other.user_agent);
        self.headers.extend(other.headers);
        self
    }

    /// The authentication method these settings select.
    pub fn auth(&self) -> Result<Auth> {
        self.validate_auth()?;

        let password = || text(&self.pkcs12_password).unwrap_or_default().to_string();

        let auth = if let Some(token) = text(&self.api_token) {
            Auth::Token {
                token: token.to_string(),
                header: text(&self.api_header)
                    .unwrap_or(DEFAULT_TOKEN_HEADER)
                    .to_string(),
            }
        } else if let (Some(cert), Some(key)) = (text(&self.client_cert), text(&self.client_key)) {
            Auth::Pem {
                cert: cert.to_string(),
                key: key.to_string(),
            }
        } else if let (Some(cert_path), Some(key_path)) =
            (path(&self.client_cert_file), path(&self.client_key_file))
        {
            Auth::PemFiles {
                cert_path: cert_path.to_path_buf(),
                key_path: key_path.to_path_buf(),
            }
        } else if let Some(bundle) = text(&self.pkcs12_bundle) {
            Auth::Pkcs12 {
                bundle: bundle.to_string(),
                password: password(),
            }
        } else if let Some(file) = path(&self.pkcs12_file) {
            Auth::Pkcs12File {
                path: file.to_path_buf(),
                password: password(),
            }
        } else {
            Auth::None
        };

        if text(&self.pkcs12_password).is_some()
            && !matches!(auth, Auth::Pkcs12 { .. } | Auth::Pkcs12File { .. })
        {
            warn!("pkcs12_password is set without a PKCS12 bundle, ignoring it");
        }

        Ok(auth)
    }

    /// Validate and convert into a [`ClientConfig`].
    pub fn to_client_config(&self) -> Result<ClientConfig> {
        self.validate()?;

        let mut builder = ClientConfig::builder(text(&self.api_url).unwrap_or_default())
            .auth(self.auth()?);
        if let Some(secs) = self.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(insecure) = self.insecure {
            builder = builder.insecure(insecure);
        }
        if let Some(attempts) = self.retry_attempts {
            builder = builder.retry_attempts(attempts);
        }
        if let Some(max) = self.max_idle_conns {
            builder = builder.max_idle_conns(max);
        }
        if let Some(secs) = self.idle_conn_timeout {
            builder = builder.idle_conn_timeout(Duration::from_secs(secs));
        }
        if let Some(disable) = self.disable_keep_alives {
            builder = builder.disable_keep_alives(disable);
        }
        if let Some(user_agent) = text(&self.user_agent) {
            builder = builder.user_agent(user_agent);
        }
        for (name, value) in &self.headers {
            builder = builder.default_header(name.clone(), value.clone());
        }

        let config = builder.build();
        debug!(
            base_url = %config.base_url,
            auth = config.auth.kind(),
            insecure = config.insecure,
            "built client configuration from settings"
        );
        Ok(config)
    }

    /// Validate, convert and construct a [`RestClient`].
    pub fn into_client(self) -> Result<RestClient> {
        Ok(RestClient::new(self.to_client_config()?)?)
    }

    fn validate_auth(&self) -> Result<()> {
        ConfigValidator::pair(
            ("client_cert", text(&self.client_cert).is_some()),
            ("client_key", text(&self.client_key).is_some()),
        )?;
        ConfigValidator::pair(
            ("client_cert_file", path(&self.client_cert_file).is_some()),
            ("client_key_file", path(&self.client_key_file).is_some()),
        )?;
        ConfigValidator::at_most_one(&[
            ("api_token", text(&self.api_token).is_some()),
            ("client_cert", text(&self.client_cert).is_some()),
            ("client_cert_file", path(&self.client_cert_file).is_some()),
            ("pkcs12_bundle", text(&self.pkcs12_bundle).is_some()),
            ("pkcs12_file", path(&self.pkcs12_file).is_some()),
        ])
    }
}

impl Validate for ProviderSettings {
    fn validate(&self) -> Result<()> {
        ConfigValidator::not_empty(self.api_url.as_deref(), "api_url")?;
        ConfigValidator::is_url(text(&self.api_url).unwrap_or_default(), "api_url")?;
        self.validate_auth()
    }
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn redact(value: &Option<String>) -> Option<&'static str> {
            value.as_ref().map(|_| "<redacted>")
        }

        f.debug_struct("ProviderSettings")
            .field("api_url", &self.api_url)
            .field("api_token", &redact(&self.api_token))
            .field("api_header", &self.api_header)
            .field("client_cert", &redact(&self.client_cert))
            .field("client_key", &redact(&self.client_key))
            .field("client_cert_file", &self.client_cert_file)
            .field("client_key_file", &self.client_key_file)
            .field("pkcs12_bundle", &redact(&self.pkcs12_bundle))
            .field("pkcs12_file", &self.pkcs12_file)
            .field("pkcs12_password", &redact(&self.pkcs12_password))
            .field("timeout", &self.timeout)
            .field("insecure", &self.insecure)
            .field("retry_attempts", &self.retry_attempts)
            .field("max_idle_conns", &self.max_idle_conns)
            .field("idle_conn_timeout", &self.idle_conn_timeout)
            .field("disable_keep_alives", &self.disable_keep_alives)
            .field("user_agent", &self.user_agent)
            .field("headers", &self.headers)
            .finish()
    }
}

fn text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn path(value: &Option<PathBuf>) -> Option<&Path> {
    value.as_deref().filter(|p| !p.as_os_str().is_empty())
}

fn string_pairs(value: Value) -> Vec<(String, String)> {
    match value {
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(k, v)| match v {
                Value::String(s) => Some((k, s)),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "a non-negative integer",
        })
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "a boolean",
        }),
    }
}

/// Parse `Name=value,Other=value` into a header map.
fn parse_headers(key: &str, value: &str) -> Result<BTreeMap<String, String>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, v)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), v.trim().to_string()))
            }
            _ => Err(SettingsError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
                expected: "a comma separated list of Name=value pairs",
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../restful-client/tests/fixtures")
            .join(name)
    }

    fn vars(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn with_url() -> ProviderSettings {
        ProviderSettings {
            api_url: Some("https://api.example.com".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_flow_into_client_config() {
        let config = with_url().to_client_config().unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.max_idle_conns, 100);
        assert!(!config.insecure);
        assert!(matches!(config.auth, Auth::None));
    }

    #[test]
    fn test_token_uses_default_header() {
        let settings = ProviderSettings {
            api_token: Some("Bearer abc".into()),
            ..with_url()
        };
        match settings.auth().unwrap() {
            Auth::Token { token, header } => {
                assert_eq!(token, "Bearer abc");
                assert_eq!(header, "Authorization");
            }
            other => panic!("unexpected auth: {:?}", other),
        }

        let custom = ProviderSettings {
            api_header: Some("X-API-Key".into()),
            ..settings
        };
        assert!(matches!(
            custom.auth().unwrap(),
            Auth::Token { header, .. } if header == "X-API-Key"
        ));
    }

    #[test]
    fn test_missing_or_invalid_url() {
        assert!(matches!(
            ProviderSettings::default().validate(),
            Err(SettingsError::ValidationError(_))
        ));
        let settings = ProviderSettings {
            api_url: Some("ftp://example.com".into()),
            ..Default::default()
        };
        assert!(matches!(
            settings.to_client_config(),
            Err(SettingsError::ValidationError(_))
        ));
    }

    #[test]
    fn test_multiple_auth_methods_rejected() {
        let settings = ProviderSettings {
            api_token: Some("abc".into()),
            pkcs12_file: Some("bundle.p12".into()),
            ..with_url()
        };
        match settings.validate() {
            Err(SettingsError::MultipleAuthMethods(found)) => {
                assert_eq!(found, vec!["api_token", "pkcs12_file"]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_incomplete_certificate_pairs_rejected() {
        let settings = ProviderSettings {
            client_cert: Some("-----BEGIN CERTIFICATE-----".into()),
            ..with_url()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::IncompleteCertificatePair {
                present: "client_cert",
                missing: "client_key"
            })
        ));

        let settings = ProviderSettings {
            client_key_file: Some("client.key".into()),
            ..with_url()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::IncompleteCertificatePair {
                present: "client_key_file",
                missing: "client_cert_file"
            })
        ));
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let settings = ProviderSettings {
            api_token: Some("   ".into()),
            pkcs12_bundle: Some(String::new()),
            ..with_url()
        };
        assert!(matches!(settings.auth().unwrap(), Auth::None));
    }

    #[test]
    fn test_pkcs12_file_with_password() {
        let settings = ProviderSettings {
            pkcs12_file: Some(fixture("client.p12")),
            pkcs12_password: Some("changeit".into()),
            ..with_url()
        };
        match settings.auth().unwrap() {
            Auth::Pkcs12File { path, password } => {
                assert!(path.ends_with("client.p12"));
                assert_eq!(password, "changeit");
            }
            other => panic!("unexpected auth: {:?}", other),
        }
    }

    #[test]
    fn test_env_vars_are_coerced() {
        let settings = ProviderSettings::from_env_vars(vars(&[
            ("RESTFUL_API_URL", "https://api.example.com"),
            ("RESTFUL_TIMEOUT", "5"),
            ("RESTFUL_INSECURE", "yes"),
            ("RESTFUL_RETRY_ATTEMPTS", "7"),
            ("RESTFUL_DISABLE_KEEP_ALIVES", "true"),
            ("RESTFUL_HEADERS", "X-Team=platform, X-Env=dev"),
            ("RESTFUL_LOG_LEVEL", "debug"),
        ]))
        .unwrap();

        assert_eq!(settings.timeout, Some(5));
        assert_eq!(settings.insecure, Some(true));
        assert_eq!(settings.retry_attempts, Some(7));
        assert_eq!(settings.disable_keep_alives, Some(true));
        assert_eq!(settings.headers["X-Env"], "dev");

        let config = settings.to_client_config().unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.disable_keep_alives);
        assert_eq!(config.default_headers.len(), 2);
    }

    #[test]
    fn test_env_vars_reject_bad_values() {
        let err = ProviderSettings::from_env_vars(vars(&[("RESTFUL_TIMEOUT", "soon")]))
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { ref key, .. } if key == "timeout"));

        let err = ProviderSettings::from_env_vars(vars(&[("RESTFUL_INSECURE", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));

        let err = ProviderSettings::from_env_vars(vars(&[("RESTFUL_HEADERS", "nope")]))
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));
    }

    #[test]
    fn test_merge_prefers_later_source() {
        let file = ProviderSettings {
            api_url: Some("https://file.example.com".into()),
            timeout: Some(10),
            headers: BTreeMap::from([("X-A".to_string(), "1".to_string())]),
            ..Default::default()
        };
        let env = ProviderSettings {
            api_url: Some("https://env.example.com".into()),
            headers: BTreeMap::from([("X-B".to_string(), "2".to_string())]),
            ..Default::default()
        };

        let merged = file.merge(env);
        assert_eq!(merged.api_url.as_deref(), Some("https://env.example.com"));
        assert_eq!(merged.timeout, Some(10));
        assert_eq!(merged.headers.len(), 2);
    }

    #[test]
    fn test_from_json_and_toml_files() {
        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            json,
            r#"{{"api_url": "https://api.example.com", "api_token": "abc", "timeout": 15}}"#
        )
        .unwrap();
        let settings = ProviderSettings::from_file(json.path()).unwrap();
        assert_eq!(settings.timeout, Some(15));
        assert!(matches!(settings.auth().unwrap(), Auth::Token { .. }));

        let mut toml = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            toml,
            "api_url = \"https://api.example.com\"\nmax_idle_conns = 4\n\n[headers]\nX-Team = \"platform\"\n"
        )
        .unwrap();
        let settings = ProviderSettings::from_file(toml.path()).unwrap();
        assert_eq!(settings.max_idle_conns, Some(4));
        assert_eq!(settings.headers["X-Team"], "platform");
    }

    #[test]
    fn test_from_env_file() {
        let mut env = tempfile::Builder::new().suffix(".env").tempfile().unwrap();
        writeln!(env, "RESTFUL_API_URL=https://api.example.com").unwrap();
        writeln!(env, "RESTFUL_RETRY_ATTEMPTS=2").unwrap();

        let settings = ProviderSettings::from_file(env.path()).unwrap();
        assert_eq!(settings.retry_attempts, Some(2));
        assert_eq!(ProviderSettings::from_dotenv(env.path()).unwrap(), settings);
    }

    #[test]
    fn test_unknown_file_field_rejected() {
        let result = ProviderSettings::from_value(serde_json::json!({"api_uri": "x"}));
        assert!(matches!(result, Err(SettingsError::ParseError(_))));
    }

    #[test]
    fn test_into_client_with_pem_files() {
        let settings = ProviderSettings {
            client_cert_file: Some(fixture("client.crt")),
            client_key_file: Some(fixture("client.key")),
            ..with_url()
        };
        assert!(settings.into_client().is_ok());

        let broken = ProviderSettings {
            client_cert_file: Some("/nonexistent/client.crt".into()),
            client_key_file: Some("/nonexistent/client.key".into()),
            ..with_url()
        };
        assert!(matches!(
            broken.into_client(),
            Err(SettingsError::Client(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let settings = ProviderSettings {
            api_token: Some("super-secret".into()),
            ..with_url()
        };
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
