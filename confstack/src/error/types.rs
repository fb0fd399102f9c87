//! Primary error enum for configuration loading.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::aggregate::AggregatedErrors;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A configuration file exists but could not be read.
    #[error("failed to read configuration file '{path}': {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file exists but no decoder could parse it.
    #[error("failed to decode configuration file '{path}': {source}")]
    Decode {
        /// Path of the undecodable file.
        path: PathBuf,
        /// Error reported by the last decoder attempted.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An environment variable or default literal does not match the
    /// field's declared type.
    #[error("cannot convert {key}={value:?} to {expected}: {message}")]
    Conversion {
        /// Environment variable name or field path the value came from.
        key: String,
        /// The offending raw value.
        value: String,
        /// Human-readable name of the declared type.
        expected: &'static str,
        /// Explanation from the parser.
        message: String,
    },

    /// A required field is still blank after every source and default.
    #[error("{path} is required, but blank")]
    Required {
        /// Dotted path of the blank field.
        path: String,
    },

    /// Strict mode found source keys without a matching field.
    #[error("{0}")]
    UnmatchedKeys(UnmatchedKeys),

    /// A field declaration is malformed.
    #[error("invalid field declaration for '{path}': {message}")]
    Schema {
        /// Dotted path of the offending field.
        path: String,
        /// Explanation of the problem.
        message: String,
    },

    /// The merged record could not be projected onto the target type.
    #[error("failed to build configuration from merged sources: {0}")]
    Extract(#[from] serde_json::Error),

    /// Multiple errors occurred while loading configuration.
    #[error("multiple configuration errors:\n{0}")]
    Aggregate(Box<AggregatedErrors>),
}

impl ConfigError {
    /// Returns the unmatched keys when this is an
    /// [`ConfigError::UnmatchedKeys`] error.
    ///
    /// # Examples
    ///
    /// ```
    /// use confstack::{ConfigError, UnmatchedKeys};
    ///
    /// let err = ConfigError::UnmatchedKeys(UnmatchedKeys::new(vec!["Test".to_owned()]));
    /// assert_eq!(err.unmatched_keys(), Some(&["Test".to_owned()][..]));
    /// ```
    #[must_use]
    pub fn unmatched_keys(&self) -> Option<&[String]> {
        match self {
            Self::UnmatchedKeys(keys) => Some(keys.keys()),
            _ => None,
        }
    }
}

/// Ordered list of source keys that matched no declared field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnmatchedKeys {
    keys: Vec<String>,
}

impl UnmatchedKeys {
    /// Wrap the collected keys.
    #[must_use]
    pub const fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    /// The unmatched keys, dotted for nested file keys and verbatim for
    /// environment variables.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Number of unmatched keys.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no keys were collected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Display for UnmatchedKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unmatched configuration keys: {}", self.keys.join(", "))
    }
}
