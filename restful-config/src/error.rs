// Error types for settings loading

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    LoadError(String),

    #[error("Failed to parse settings: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid value for {key}: {value:?} is not {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("Only one authentication method may be set, found: {}", .0.join(", "))]
    MultipleAuthMethods(Vec<&'static str>),

    #[error("Incomplete certificate authentication: {present} is set but {missing} is not")]
    IncompleteCertificatePair {
        present: &'static str,
        missing: &'static str,
    },

    #[error("Client configuration error: {0}")]
    Client(#[from] restful_client::ConfigError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SettingsError>;
