//! # Restful Resource
//!
//! Lifecycle management for generic REST resources on top of
//! [`restful_client`].
//!
//! - [`RestResource`] creates, reads, updates, deletes and imports resources,
//!   checking each response against a [`StatusPolicy`] and recording drift
//!   on reads.
//! - [`fetch`] runs a one-shot data request.
//! - [`project`] flattens a JSON body into a string map.
//!
//! ## Example
//!
//! ```rust,no_run
//! use restful_client::{ClientConfig, RestClient};
//! use restful_resource::{ResourceState, RestResource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RestClient::new(ClientConfig::builder("https://api.example.com").build())?;
//!     let resources = RestResource::new(client);
//!
//!     let desired = ResourceState::new("/users", "jdoe").with_body(r#"{"name":"John"}"#);
//!     let created = resources.create(&desired).await?;
//!
//!     if let Some(current) = resources.read(&created).await?
//!         && current.has_drift()
//!     {
//!         println!("drift: {}", current.drift.unwrap_or_default());
//!     }
//!     Ok(())
//! }
//! ```

mod data;
mod error;
mod import;
mod method;
mod projector;
mod resource;
mod state;
mod status;

pub use data::{DataRequest, DataResult, fetch};
pub use error::{ResourceError, Result};
pub use import::{ImportId, parse_import_id};
pub use method::{Operation, resolve_method};
pub use projector::{Projection, project, render_value};
pub use resource::RestResource;
pub use state::{MethodOverrides, ResourceState, ResponseSnapshot};
pub use status::{StatusOutcome, StatusPolicy};
