//! Layered configuration loading for strongly typed records.
//!
//! A record deriving [`Configure`] is populated from, in increasing order of
//! precedence:
//!
//! 1. the values it already holds,
//! 2. one or more configuration files (JSON, TOML or YAML),
//! 3. an environment-specific sibling of each file (`config.production.yaml`),
//! 4. environment variables (`CONFIG_DB_PORT`, or a custom prefix),
//!
//! after which declared defaults fill fields that are still zero and
//! `required` fields are enforced. Strict mode additionally rejects keys that
//! no field declares.
//!
//! ```rust,no_run
//! use confstack::Configure;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Deserialize, Serialize, Configure)]
//! struct Database {
//!     name: String,
//!     #[config(default = "root")]
//!     user: String,
//!     #[config(required, env = "DBPassword")]
//!     password: String,
//!     #[config(default = 3306)]
//!     port: u16,
//! }
//!
//! #[derive(Debug, Default, Deserialize, Serialize, Configure)]
//! struct AppConfig {
//!     #[config(default = "app")]
//!     app_name: String,
//!     db: Database,
//! }
//!
//! let config: AppConfig = confstack::load_from(["config.yml"])?;
//! # Ok::<(), std::sync::Arc<confstack::ConfigError>>(())
//! ```

pub use confstack_macros::Configure;

mod defaults;
pub mod env;
mod error;
pub mod file;
mod loader;
mod merge;
mod result_ext;
pub mod schema;
mod tree;
mod validate;

use std::sync::Arc;

pub use env::EnvVars;
pub use error::{AggregatedErrors, ConfigError, IntoFigmentError, UnmatchedKeys};
pub use file::Format;
pub use loader::{Loader, LoaderSettings, environment, load, load_from};
pub use merge::merge_value;
pub use result_ext::{ConfigResultExt, ResultIntoFigment};
pub use schema::{
    ConfigValue, Configure, FieldDescriptor, FieldOptions, FieldSet, Kind, Schema, ValueType,
};

/// Result type used throughout the crate.
///
/// Errors are shared behind an [`Arc`] so they can be cloned into aggregated
/// reports without copying their sources.
pub type ConfigResult<T> = Result<T, Arc<ConfigError>>;
