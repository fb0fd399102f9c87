//! Shared fixtures for integration tests.
//!
//! `TestConfig` mirrors a typical application record: a defaulted name, a
//! scalar list, a nested database section with a required aliased password,
//! a list of contacts with a required email, and a flattened section whose
//! fields live at the top level.
#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::path::Path;

use anyhow::{Result, anyhow};
use confstack::{ConfigError, Configure, EnvVars, Loader, LoaderSettings};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, Configure)]
#[serde(rename_all = "PascalCase")]
pub struct Database {
    pub name: String,
    #[config(default = "root")]
    pub user: String,
    #[config(required, env = "DBPassword")]
    pub password: String,
    #[config(default = 3306)]
    pub port: u32,
    #[serde(rename = "SSL")]
    #[config(default = true)]
    pub ssl: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, Configure)]
#[serde(rename_all = "PascalCase")]
pub struct Contact {
    pub name: String,
    #[config(required)]
    pub email: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, Configure)]
#[serde(rename_all = "PascalCase")]
pub struct Anonymous {
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, Configure)]
#[serde(rename_all = "PascalCase")]
pub struct TestConfig {
    #[serde(rename = "APPName")]
    #[config(default = "config")]
    pub app_name: String,
    pub hosts: Vec<String>,
    #[serde(rename = "DB")]
    pub db: Database,
    pub contacts: Vec<Contact>,
    #[serde(flatten)]
    pub anonymous: Anonymous,
}

/// A fully populated record.
pub fn sample() -> TestConfig {
    TestConfig {
        app_name: "config".to_owned(),
        hosts: vec!["http://example.org".to_owned(), "http://example.com".to_owned()],
        db: Database {
            name: "config".to_owned(),
            user: "config".to_owned(),
            password: "config".to_owned(),
            port: 3306,
            ssl: true,
        },
        contacts: vec![Contact {
            name: "Ada".to_owned(),
            email: "ada@example.com".to_owned(),
        }],
        anonymous: Anonymous {
            description: "This is an anonymous embedded struct whose environment variables \
                          should NOT include 'ANONYMOUS'"
                .to_owned(),
        },
    }
}

/// [`sample`] written as YAML.
pub const SAMPLE_YAML: &str = r"APPName: config
Hosts:
  - http://example.org
  - http://example.com
DB:
  Name: config
  User: config
  Password: config
  Port: 3306
  SSL: true
Contacts:
  - Name: Ada
    Email: ada@example.com
Description: This is an anonymous embedded struct whose environment variables should NOT include 'ANONYMOUS'
";

/// [`sample`] written as TOML.
pub const SAMPLE_TOML: &str = r#"APPName = "config"
Hosts = ["http://example.org", "http://example.com"]
Description = "This is an anonymous embedded struct whose environment variables should NOT include 'ANONYMOUS'"

[DB]
Name = "config"
User = "config"
Password = "config"
Port = 3306
SSL = true

[[Contacts]]
Name = "Ada"
Email = "ada@example.com"
"#;

/// Loader with `settings` and exactly the variables in `vars`.
pub fn loader(settings: LoaderSettings, vars: &[(&str, &str)]) -> Loader {
    Loader::new(settings).with_env(vars.iter().copied().collect::<EnvVars>())
}

/// Load a `T` from `paths`, converting the error for `?`.
pub fn load<T, P>(loader: &Loader, paths: &[P]) -> Result<T>
where
    T: Configure + Default,
    P: AsRef<Path>,
{
    loader
        .load_from::<T, _, _>(paths)
        .map_err(|err| anyhow!(err.to_string()))
}

/// Load a `T` from `paths`, expecting failure.
pub fn load_err<T, P>(loader: &Loader, paths: &[P]) -> Result<std::sync::Arc<ConfigError>>
where
    T: Configure + Default + std::fmt::Debug,
    P: AsRef<Path>,
{
    match loader.load_from::<T, _, _>(paths) {
        Ok(value) => Err(anyhow!("load unexpectedly succeeded with {value:?}")),
        Err(err) => Ok(err),
    }
}
