//! Restful Logging
//!
//! Installs a `tracing` subscriber for the restful crates, which emit
//! structured events through the `tracing` macros (`debug!` per attempt,
//! `warn!` on retries and drift, `trace!` on completion).
//!
//! # Usage
//!
//! ```rust,no_run
//! restful_log::init();
//!
//! tracing::info!(endpoint = "/users", "starting sync");
//! ```
//!
//! # Environment Variables
//!
//! - `RESTFUL_DEBUG=1` - Enable debug logging
//! - `RESTFUL_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `RESTFUL_LOG_FORMAT=pretty|json|compact` - Set output format
//! - `RESTFUL_LOG_COLOR=1|0` - Enable/disable colors
//!
//! `RUST_LOG`, when set, takes precedence over the level.

use once_cell::sync::OnceCell;
use std::env;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

// ============================================================================
// Log Levels
// ============================================================================

/// Minimum level of events that are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    /// Trace level (most verbose)
    Trace = 0,
    /// Debug level
    Debug = 1,
    /// Info level
    Info = 2,
    /// Warning level
    Warn = 3,
    /// Error level (least verbose)
    Error = 4,
    /// Off (no logging)
    Off = 5,
}

impl Level {
    /// Get level from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    /// Get level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    /// Directive understood by [`EnvFilter`].
    pub fn directive(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Multi-line human readable format
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON format for structured logging
    Json,
}

impl Format {
    /// Get format from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration of the installed subscriber.
static INSTALLED: OnceCell<LogConfig> = OnceCell::new();

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether debug mode is enabled
    pub debug: bool,
    /// Minimum log level
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether colors are enabled
    pub color: bool,
    /// Whether to include the event target
    pub targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            color: false, // JSON output doesn't use colors
            targets: true,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| {
            lookup(key).map(|v| {
                let v = v.trim().to_lowercase();
                v == "1" || v == "true" || v == "yes"
            })
        };

        let debug = flag("RESTFUL_DEBUG").unwrap_or(false);

        let level = lookup("RESTFUL_LOG_LEVEL")
            .and_then(|s| Level::from_str(&s))
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = lookup("RESTFUL_LOG_FORMAT")
            .and_then(|s| Format::from_str(&s))
            .unwrap_or(Format::Json);

        // Assume color if not explicitly disabled and a terminal is declared
        let color = flag("RESTFUL_LOG_COLOR")
            .unwrap_or_else(|| lookup("NO_COLOR").is_none() && lookup("TERM").is_some());

        Self {
            debug,
            level,
            format,
            color: color && format != Format::Json,
            targets: true,
        }
    }

    /// Set the level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable colors.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Effective level, lowered to `Debug` in debug mode.
    pub fn effective_level(&self) -> Level {
        if self.debug && self.level > Level::Debug {
            Level::Debug
        } else {
            self.level
        }
    }

    /// Build the event filter. `RUST_LOG` wins when set.
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.effective_level().directive()))
    }

    fn layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(self.color)
            .with_target(self.targets);

        match self.format {
            Format::Pretty => layer.pretty().boxed(),
            Format::Compact => layer.compact().boxed(),
            #[cfg(feature = "json")]
            Format::Json => layer.json().boxed(),
            #[cfg(not(feature = "json"))]
            Format::Json => layer.compact().boxed(),
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Initialize logging from the environment.
///
/// Does nothing if a global subscriber is already installed.
pub fn init() {
    let _ = try_init(LogConfig::from_env());
}

/// Install a global subscriber for the given configuration.
pub fn try_init(config: LogConfig) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(config.layer())
        .with(config.filter())
        .try_init()?;

    tracing::debug!(
        level = %config.effective_level(),
        format = ?config.format,
        "restful logging initialized"
    );
    let _ = INSTALLED.set(config);
    Ok(())
}

/// Configuration of the subscriber installed by this crate, if any.
pub fn config() -> Option<&'static LogConfig> {
    INSTALLED.get()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Off);
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!(Level::from_str("debug"), Some(Level::Debug));
        assert_eq!(Level::from_str("DEBUG"), Some(Level::Debug));
        assert_eq!(Level::from_str("warning"), Some(Level::Warn));
        assert_eq!(Level::from_str("none"), Some(Level::Off));
        assert_eq!(Level::from_str("invalid"), None);
        assert_eq!(Level::Warn.directive(), "warn");
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(Format::from_str("pretty"), Some(Format::Pretty));
        assert_eq!(Format::from_str("Compact"), Some(Format::Compact));
        assert_eq!(Format::from_str("json"), Some(Format::Json));
        assert_eq!(Format::from_str("invalid"), None);
    }

    #[test]
    fn test_config_defaults_without_variables() {
        let config = LogConfig::from_lookup(lookup(&[]));
        assert_eq!(config, LogConfig::default());
    }

    #[test]
    fn test_debug_flag_lowers_level() {
        let config = LogConfig::from_lookup(lookup(&[("RESTFUL_DEBUG", "true")]));
        assert!(config.debug);
        assert_eq!(config.level, Level::Debug);

        let config = LogConfig::from_lookup(lookup(&[
            ("RESTFUL_DEBUG", "1"),
            ("RESTFUL_LOG_LEVEL", "error"),
        ]));
        assert_eq!(config.level, Level::Error);
        assert_eq!(config.effective_level(), Level::Debug);

        let config = LogConfig::from_lookup(lookup(&[("RESTFUL_LOG_LEVEL", "trace")]));
        assert_eq!(config.effective_level(), Level::Trace);
    }

    #[test]
    fn test_format_and_color() {
        let config = LogConfig::from_lookup(lookup(&[
            ("RESTFUL_LOG_FORMAT", "pretty"),
            ("TERM", "xterm-256color"),
        ]));
        assert_eq!(config.format, Format::Pretty);
        assert!(config.color);

        let config = LogConfig::from_lookup(lookup(&[
            ("RESTFUL_LOG_FORMAT", "compact"),
            ("RESTFUL_LOG_COLOR", "0"),
            ("TERM", "xterm"),
        ]));
        assert!(!config.color);

        let config = LogConfig::from_lookup(lookup(&[
            ("RESTFUL_LOG_FORMAT", "json"),
            ("RESTFUL_LOG_COLOR", "1"),
        ]));
        assert!(!config.color);

        let config = LogConfig::from_lookup(lookup(&[("RESTFUL_LOG_FORMAT", "xml")]));
        assert_eq!(config.format, Format::Json);
    }

    #[test]
    fn test_builder_methods() {
        let config = LogConfig::default()
            .with_level(Level::Warn)
            .with_format(Format::Compact)
            .with_color(true);
        assert_eq!(config.level, Level::Warn);
        assert_eq!(config.format, Format::Compact);
        assert!(config.color);
    }

    #[test]
    fn test_try_init_installs_once() {
        let config = LogConfig::default().with_format(Format::Compact);

        assert!(try_init(config.clone()).is_ok());
        assert_eq!(crate::config(), Some(&config));

        assert!(try_init(LogConfig::default()).is_err());
        assert_eq!(crate::config(), Some(&config));

        // Already installed, so this is a no-op.
        init();
        tracing::warn!(attempt = 1, "retrying request");
    }
}
