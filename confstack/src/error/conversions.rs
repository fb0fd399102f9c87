//! Conversions between `ConfigError` and the error types of collaborating
//! crates.

use std::sync::Arc;

use super::ConfigError;

impl From<ConfigError> for figment::Error {
    /// Allow using `?` inside `figment::Jail` closures and other code that
    /// expects Figment's error type.
    fn from(e: ConfigError) -> Self {
        Self::from(e.to_string())
    }
}

/// Convert shared configuration errors into `figment::Error`.
pub trait IntoFigmentError {
    /// Convert into a `figment::Error`, preserving the message text.
    fn into_figment(self) -> figment::Error;
}

impl IntoFigmentError for Arc<ConfigError> {
    fn into_figment(self) -> figment::Error {
        figment::Error::from(self.to_string())
    }
}

impl IntoFigmentError for &Arc<ConfigError> {
    fn into_figment(self) -> figment::Error {
        figment::Error::from(self.to_string())
    }
}
