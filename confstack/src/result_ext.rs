//! Extensions for mapping errors to `ConfigResult` concisely.
//!
//! These helpers replace repetitive `.map_err(|e| Arc::new(e.into()))`
//! chains when external error types flow into the crate's
//! `ConfigResult<T>` alias (`Result<T, Arc<ConfigError>>`).
//!
//! # Examples
//!
//! ```
//! use confstack::{ConfigResult, ConfigResultExt};
//!
//! fn serialise() -> ConfigResult<serde_json::Value> {
//!     // serde_json::Error implements Into<ConfigError>
//!     serde_json::to_value(42).into_config()
//! }
//! # assert!(serialise().is_ok());
//! ```

use std::sync::Arc;

use crate::{ConfigError, ConfigResult, IntoFigmentError};

/// Map any `Result<T, E>` with `E: Into<ConfigError>` into a
/// [`ConfigResult`].
pub trait ConfigResultExt<T> {
    /// Convert the error using `Into<ConfigError>`.
    ///
    /// # Errors
    ///
    /// Propagates the original error wrapped in an [`Arc`].
    fn into_config(self) -> ConfigResult<T>;
}

impl<T, E> ConfigResultExt<T> for Result<T, E>
where
    E: Into<ConfigError>,
{
    fn into_config(self) -> ConfigResult<T> {
        self.map_err(|e| Arc::new(e.into()))
    }
}

/// Convert `Result<T, Arc<ConfigError>>` into `Result<T, figment::Error>`.
#[allow(
    clippy::result_large_err,
    reason = "figment::Error is large; this helper exists for Jail-based tests"
)]
pub trait ResultIntoFigment<T> {
    /// Map the error into a `figment::Error` using [`IntoFigmentError`].
    ///
    /// # Errors
    ///
    /// Returns a `figment::Error` containing the original message.
    fn to_figment(self) -> Result<T, figment::Error>;
}

impl<T> ResultIntoFigment<T> for Result<T, Arc<ConfigError>> {
    fn to_figment(self) -> Result<T, figment::Error> {
        self.map_err(IntoFigmentError::into_figment)
    }
}
