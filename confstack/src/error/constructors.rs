//! Constructors and aggregation helpers for `ConfigError`.

use std::path::Path;
use std::sync::Arc;

use super::{AggregatedErrors, ConfigError};

impl ConfigError {
    /// Tries to build a [`ConfigError`] from an iterator of errors.
    ///
    /// Returns `None` for an empty iterator, the error itself when exactly one
    /// uniquely owned error is supplied, and [`Self::Aggregate`] otherwise.
    #[must_use]
    pub fn try_aggregate<I, E>(errors: I) -> Option<Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Self>>,
    {
        let mut arcs: Vec<Arc<Self>> = errors.into_iter().map(Into::into).collect();
        if arcs.len() > 1 {
            return Some(Self::Aggregate(Box::new(AggregatedErrors::new(arcs))));
        }
        let last = arcs.pop()?;
        Some(Arc::try_unwrap(last).unwrap_or_else(|shared| {
            Self::Aggregate(Box::new(AggregatedErrors::new(vec![shared])))
        }))
    }

    /// Construct a conversion error for `key`.
    #[must_use]
    pub fn conversion(
        key: impl Into<String>,
        value: impl Into<String>,
        expected: &'static str,
        message: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self::Conversion {
            key: key.into(),
            value: value.into(),
            expected,
            message: message.into(),
        })
    }

    /// Construct a schema error for the field at `path`.
    #[must_use]
    pub fn schema(path: impl Into<String>, message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::Schema {
            path: path.into(),
            message: message.into(),
        })
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Arc<Self> {
        Arc::new(Self::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub(crate) fn decode(
        path: &Path,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Arc<Self> {
        Arc::new(Self::Decode {
            path: path.to_path_buf(),
            source: source.into(),
        })
    }
}
