//! Decoder selection for configuration files.

use std::fmt;
use std::path::Path;

use serde_json::Value;

#[cfg(any(feature = "json", feature = "toml", feature = "yaml"))]
use figment::Figment;
#[cfg(any(feature = "json", feature = "toml"))]
use figment::providers::Format as _;

use crate::{ConfigError, ConfigResult};

#[cfg(feature = "yaml")]
use super::yaml::SaphyrYaml;

/// Supported configuration file formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Format {
    /// `.json`
    Json,
    /// `.toml`
    Toml,
    /// `.yaml` or `.yml`
    Yaml,
}

impl Format {
    /// Order in which decoders are attempted for files without a recognised
    /// extension.
    pub const DETECTION_ORDER: [Self; 3] = [Self::Json, Self::Toml, Self::Yaml];

    /// Format named by `path`'s extension, compared case-insensitively.
    ///
    /// ```
    /// use confstack::Format;
    /// use std::path::Path;
    ///
    /// assert_eq!(Format::from_path(Path::new("config.YML")), Some(Format::Yaml));
    /// assert_eq!(Format::from_path(Path::new("config")), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Format for a bare extension such as `"toml"`.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Whether the decoder for this format was compiled in.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        match self {
            Self::Json => cfg!(feature = "json"),
            Self::Toml => cfg!(feature = "toml"),
            Self::Yaml => cfg!(feature = "yaml"),
        }
    }

    /// Decode `data` read from `path` into a record.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Decode`] when the contents are malformed, when
    /// their top level is not a mapping, or when the format's feature is
    /// disabled.
    pub fn decode(self, path: &Path, data: &str) -> ConfigResult<Value> {
        if data.trim().is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }
        match self {
            Self::Json => decode_json(path, data),
            Self::Toml => decode_toml(path, data),
            Self::Yaml => decode_yaml(path, data),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "JSON",
            Self::Toml => "TOML",
            Self::Yaml => "YAML",
        })
    }
}

/// Decode `data` with the decoder named by `path`'s extension, or with the
/// first decoder in [`Format::DETECTION_ORDER`] that yields a mapping.
///
/// # Errors
///
/// Returns [`ConfigError::Decode`] when no decoder accepts the contents. For
/// undetected formats the error of the last decoder attempted is reported.
pub fn decode(path: &Path, data: &str) -> ConfigResult<Value> {
    if let Some(format) = Format::from_path(path) {
        return format.decode(path, data);
    }
    let mut last_error = None;
    for format in Format::DETECTION_ORDER {
        if !format.is_enabled() {
            continue;
        }
        match format.decode(path, data) {
            Ok(value) => {
                tracing::trace!(path = %path.display(), %format, "detected configuration format");
                return Ok(value);
            }
            Err(err) => last_error = Some(err),
        }
    }
    Err(last_error.unwrap_or_else(|| ConfigError::decode(path, "no decoder is enabled")))
}

#[cfg(any(feature = "json", feature = "toml", feature = "yaml"))]
fn extract(path: &Path, figment: Figment) -> ConfigResult<Value> {
    let value: Value = figment
        .extract()
        .map_err(|err| ConfigError::decode(path, err.to_string()))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(ConfigError::decode(path, "top level is not a mapping"))
    }
}

#[cfg(feature = "json")]
fn decode_json(path: &Path, data: &str) -> ConfigResult<Value> {
    extract(path, Figment::from(figment::providers::Json::string(data)))
}

#[cfg(feature = "toml")]
fn decode_toml(path: &Path, data: &str) -> ConfigResult<Value> {
    // Validate first so syntax errors carry this file's context.
    toml::from_str::<toml::Table>(data).map_err(|err| ConfigError::decode(path, err))?;
    extract(path, Figment::from(figment::providers::Toml::string(data)))
}

#[cfg(feature = "yaml")]
fn decode_yaml(path: &Path, data: &str) -> ConfigResult<Value> {
    extract(path, Figment::from(SaphyrYaml::string(path, data)))
}

#[cfg(not(feature = "json"))]
fn decode_json(path: &Path, _data: &str) -> ConfigResult<Value> {
    Err(disabled(path, Format::Json))
}

#[cfg(not(feature = "toml"))]
fn decode_toml(path: &Path, _data: &str) -> ConfigResult<Value> {
    Err(disabled(path, Format::Toml))
}

#[cfg(not(feature = "yaml"))]
fn decode_yaml(path: &Path, _data: &str) -> ConfigResult<Value> {
    Err(disabled(path, Format::Yaml))
}

#[cfg(not(all(feature = "json", feature = "toml", feature = "yaml")))]
fn disabled(path: &Path, format: Format) -> std::sync::Arc<ConfigError> {
    let feature = format.to_string().to_ascii_lowercase();
    ConfigError::decode(
        path,
        format!("{format} support is disabled: enable the '{feature}' feature"),
    )
}
