//! Declared defaults and required-field enforcement through the loader.

mod common;

use std::time::Duration;

use anyhow::{Result, ensure};
use common::{TestConfig, load, load_err, loader};
use confstack::{ConfigError, Configure, LoaderSettings};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

#[test]
fn omitted_fields_receive_defaults() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "DB:\n  Name: main\n  Password: secret\n")?;
    let loaded: TestConfig = load(&loader(LoaderSettings::new(), &[]), &[path])?;
    ensure!(loaded.app_name == "config");
    ensure!(loaded.db.user == "root");
    ensure!(loaded.db.port == 3306);
    ensure!(loaded.db.ssl);
    ensure!(loaded.db.name == "main");
    Ok(())
}

#[test]
fn missing_required_field_fails() -> Result<()> {
    let err = load_err::<TestConfig, &str>(&loader(LoaderSettings::new(), &[]), &[])?;
    ensure!(
        matches!(err.as_ref(), ConfigError::Required { path } if path == "DB.Password"),
        "got {err}"
    );
    ensure!(err.to_string() == "DB.Password is required, but blank");
    Ok(())
}

#[test]
fn alias_satisfies_required_field() -> Result<()> {
    let loaded: TestConfig = load::<_, &str>(
        &loader(LoaderSettings::new(), &[("DBPassword", "from-alias")]),
        &[],
    )?;
    ensure!(loaded.db.password == "from-alias");
    Ok(())
}

#[test]
fn alias_replaces_prefixed_name() -> Result<()> {
    let err = load_err::<TestConfig, &str>(
        &loader(LoaderSettings::new(), &[("CONFIG_DB_PASSWORD", "ignored")]),
        &[],
    )?;
    ensure!(matches!(err.as_ref(), ConfigError::Required { .. }), "got {err}");
    Ok(())
}

#[test]
fn every_blank_required_field_is_reported() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"Contacts": [{"Name": "a"}, {"Name": "b", "Email": "b@x"}]}"#)?;
    let err = load_err::<TestConfig, _>(&loader(LoaderSettings::new(), &[]), &[path])?;
    let ConfigError::Aggregate(errors) = err.as_ref() else {
        anyhow::bail!("expected an aggregate, got {err}");
    };
    let paths: Vec<&str> = errors
        .iter()
        .filter_map(|error| match error {
            ConfigError::Required { path } => Some(path.as_str()),
            _ => None,
        })
        .collect();
    ensure!(paths == ["DB.Password", "Contacts.0.Email"], "got {paths:?}");
    Ok(())
}

#[derive(Debug, Default, PartialEq, Deserialize, Serialize, Configure)]
struct Timing {
    #[config(default = "1m30s")]
    timeout: Duration,
    #[config(default = "2024-01-02T03:04:05Z")]
    started: Option<chrono::DateTime<chrono::Utc>>,
    #[config(default = 0.5)]
    ratio: f64,
    #[config(default = -3)]
    offset: i32,
    #[config(default = "a,b")]
    tags: Vec<String>,
}

#[test]
fn typed_defaults_are_converted() -> Result<()> {
    let loaded: Timing = load::<_, &str>(&loader(LoaderSettings::new(), &[]), &[])?;
    ensure!(loaded.timeout == Duration::from_secs(90));
    ensure!(
        loaded.started.map(|at| at.to_rfc3339()).as_deref() == Some("2024-01-02T03:04:05+00:00")
    );
    ensure!(loaded.ratio.to_string() == "0.5");
    ensure!(loaded.offset == -3);
    ensure!(loaded.tags == ["a", "b"]);
    Ok(())
}

#[test]
fn preset_values_are_not_replaced_by_defaults() -> Result<()> {
    let mut target = TestConfig::default();
    target.db.port = 5432;
    target.db.password = "preset".to_owned();
    loader(LoaderSettings::new(), &[])
        .load(&mut target, std::iter::empty::<&str>())
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    ensure!(target.db.port == 5432);
    ensure!(target.db.password == "preset");
    ensure!(target.db.user == "root");
    Ok(())
}

#[derive(Debug, Default, Deserialize, Serialize, Configure)]
struct Ratio {
    #[config(default = 1.5)]
    ratio: f64,
}

#[test]
fn tiny_non_zero_values_are_not_defaulted() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("ratio.json");
    std::fs::write(&path, r#"{"ratio": 1e-20}"#)?;
    let loaded: Ratio = load(&loader(LoaderSettings::new(), &[]), &[path])?;
    ensure!(loaded.ratio.to_string() == "0.00000000000000000001", "got {}", loaded.ratio);
    Ok(())
}
