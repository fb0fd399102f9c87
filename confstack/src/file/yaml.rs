//! Figment provider for YAML sources backed by `serde-saphyr`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use figment::{
    Metadata, Profile, Provider,
    error::Kind,
    value::{Dict, Value as FigmentValue},
};
use serde_saphyr::Options;

#[derive(Debug, Clone)]
enum Source {
    File,
    Inline(String),
}

/// Figment provider that reads a YAML mapping with strict boolean semantics
/// (`yes`/`no` stay strings).
///
/// ```
/// use confstack::file::SaphyrYaml;
/// use figment::Figment;
///
/// let figment = Figment::from(SaphyrYaml::string("inline.yml", "port: 8080\n"));
/// let port: u16 = figment.extract_inner("port")?;
/// assert_eq!(port, 8080);
/// # Ok::<(), figment::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SaphyrYaml {
    path: PathBuf,
    source: Source,
}

impl SaphyrYaml {
    /// Provider that reads `path` when queried.
    #[must_use]
    pub fn file<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            source: Source::File,
        }
    }

    /// Provider over in-memory `contents`; `path` is only used in messages.
    #[must_use]
    pub fn string<P, S>(path: P, contents: S) -> Self
    where
        P: Into<PathBuf>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            source: Source::Inline(contents.into()),
        }
    }

    fn contents(&self) -> std::io::Result<String> {
        match &self.source {
            Source::File => std::fs::read_to_string(&self.path),
            Source::Inline(contents) => Ok(contents.clone()),
        }
    }

    fn parse(contents: &str) -> Result<FigmentValue, serde_saphyr::Error> {
        serde_saphyr::from_str_with_options(
            contents,
            Options {
                strict_booleans: true,
                ..Options::default()
            },
        )
    }
}

impl Provider for SaphyrYaml {
    fn metadata(&self) -> Metadata {
        Metadata::from("YAML file", self.path.as_path())
    }

    fn data(&self) -> Result<BTreeMap<Profile, Dict>, figment::Error> {
        let contents = self.contents().map_err(|err| {
            figment::Error::from(format!("failed to read {}: {err}", self.path.display()))
        })?;
        let value = Self::parse(&contents).map_err(|err| {
            figment::Error::from(Kind::Message(format!(
                "failed to parse {}: {err}",
                self.path.display()
            )))
        })?;
        let actual = value.to_actual();
        let dict = value
            .into_dict()
            .ok_or_else(|| figment::Error::from(Kind::InvalidType(actual, "map".into())))?;
        Ok(Profile::Default.collect(dict))
    }
}
