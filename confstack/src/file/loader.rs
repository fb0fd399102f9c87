//! Resolution and decoding of configuration files.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::{ConfigError, ConfigResult};

use super::format::decode;
use super::path::{environment_variant, example_variant};

/// Files that stand in for one configuration path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Candidates {
    /// The base file and/or its environment override, base first.
    Files(Vec<PathBuf>),
    /// Neither exists; the example file is used instead.
    Example(PathBuf),
    /// Nothing exists for this path.
    Missing,
}

impl Candidates {
    /// The files to load, in merge order.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            Self::Files(paths) => paths,
            Self::Example(path) => std::slice::from_ref(path),
            Self::Missing => &[],
        }
    }
}

/// Whether `path` names a regular file. Missing paths are `false`.
fn is_regular_file(path: &Path) -> ConfigResult<bool> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(meta.is_file()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(ConfigError::io(path, err)),
    }
}

/// Work out which files represent `path` under `environment`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when a candidate exists but its metadata
/// cannot be read.
pub fn resolve(path: &Path, environment: &str) -> ConfigResult<Candidates> {
    let mut files = Vec::with_capacity(2);
    if is_regular_file(path)? {
        files.push(path.to_path_buf());
    }
    if !environment.is_empty() {
        let variant = environment_variant(path, environment);
        if is_regular_file(&variant)? {
            files.push(variant);
        }
    }
    if !files.is_empty() {
        return Ok(Candidates::Files(files));
    }
    let example = example_variant(path);
    if is_regular_file(&example)? {
        Ok(Candidates::Example(example))
    } else {
        Ok(Candidates::Missing)
    }
}

/// Read and decode the file at `path`.
///
/// Returns `Ok(None)` if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Decode`] if it is not UTF-8 or no decoder accepts it.
pub fn load_file(path: &Path) -> ConfigResult<Option<Value>> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        // Not UTF-8, so no decoder can accept it.
        Err(err) if err.kind() == ErrorKind::InvalidData => {
            return Err(ConfigError::decode(path, err));
        }
        Err(err) => return Err(ConfigError::io(path, err)),
    };
    decode(path, &data).map(Some)
}
