// Settings loading for restful clients
//
// Settings come from JSON or TOML files, `RESTFUL_*` environment variables
// and `.env` files, are validated, then turned into a
// `restful_client::ClientConfig`.
//
// ```rust,no_run
// use restful_config::ProviderSettings;
//
// let settings = ProviderSettings::load(Some("restful.toml".as_ref()))?;
// let client = settings.into_client()?;
// # Ok::<(), restful_config::SettingsError>(())
// ```

pub mod env;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use env::{ENV_PREFIX, EnvLoader};
pub use error::{Result, SettingsError};
pub use loader::{ConfigLoader, FileFormat};
pub use settings::ProviderSettings;
pub use validation::{ConfigValidator, Validate};
