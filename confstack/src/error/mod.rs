//! Error types produced by the configuration loader.

mod aggregate;
mod constructors;
mod conversions;
mod types;

pub use aggregate::AggregatedErrors;
pub use conversions::IntoFigmentError;
pub use types::{ConfigError, UnmatchedKeys};
