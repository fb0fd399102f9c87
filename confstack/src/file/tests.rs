//! Tests for format detection, decoding and candidate resolution.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow, ensure};
use figment::Figment;
use rstest::rstest;
use serde_json::json;
use test_helpers::figment::with_jail;

use super::{Candidates, Format, SaphyrYaml, decode, environment_variant, load_file, resolve};
use crate::ConfigError;

fn to_anyhow<T>(result: crate::ConfigResult<T>) -> Result<T> {
    result.map_err(|err| anyhow!(err.to_string()))
}

#[rstest]
#[case("config.json", Some(Format::Json))]
#[case("config.JSON", Some(Format::Json))]
#[case("config.toml", Some(Format::Toml))]
#[case("config.yaml", Some(Format::Yaml))]
#[case("config.yml", Some(Format::Yaml))]
#[case("config", None)]
#[case("config.conf", None)]
fn format_from_extension(#[case] path: &str, #[case] expected: Option<Format>) {
    assert_eq!(Format::from_path(Path::new(path)), expected);
}

const JSON: &str = r#"{"APPName": "demo", "DB": {"Port": 3306}}"#;
const TOML: &str = "APPName = \"demo\"\n\n[DB]\nPort = 3306\n";
const YAML: &str = "APPName: demo\nDB:\n  Port: 3306\n";

#[rstest]
#[case::json_by_extension("config.json", JSON)]
#[case::toml_by_extension("config.toml", TOML)]
#[case::yaml_by_extension("config.yml", YAML)]
#[case::json_detected("config", JSON)]
#[case::toml_detected("config", TOML)]
#[case::yaml_detected("config", YAML)]
fn decodes_every_format(#[case] path: &str, #[case] data: &str) -> Result<()> {
    let record = to_anyhow(decode(Path::new(path), data))?;
    ensure!(
        record == json!({"APPName": "demo", "DB": {"Port": 3306}}),
        "unexpected record {record}"
    );
    Ok(())
}

#[rstest]
#[case::json_extension("config.json", "{not json")]
#[case::toml_extension("config.toml", "key = = value")]
#[case::yaml_extension("config.yaml", "key: [")]
#[case::scalar_document("config", "just text")]
#[case::sequence_document("config.yml", "- a\n- b\n")]
fn undecodable_contents_are_decode_errors(#[case] path: &str, #[case] data: &str) -> Result<()> {
    let err = decode(Path::new(path), data)
        .err()
        .ok_or_else(|| anyhow!("expected decode failure"))?;
    ensure!(
        matches!(err.as_ref(), ConfigError::Decode { path: p, .. } if p == Path::new(path)),
        "unexpected error {err:?}"
    );
    Ok(())
}

#[test]
fn blank_files_decode_to_an_empty_record() -> Result<()> {
    let record = to_anyhow(decode(Path::new("config.yml"), "\n  \n"))?;
    ensure!(record == json!({}));
    Ok(())
}

#[test]
fn yaml_yes_remains_a_string() -> Result<()> {
    let figment = Figment::from(SaphyrYaml::string("config.yaml", "recipient: yes"));
    let recipient = figment
        .extract_inner::<String>("recipient")
        .map_err(|err| anyhow!(err.to_string()))?;
    ensure!(recipient == "yes", "expected string literal \"yes\"");
    Ok(())
}

#[test]
fn yaml_provider_reads_files() -> Result<()> {
    with_jail(|jail| {
        jail.create_file("config.yaml", "recipient: friend")?;
        let figment = Figment::from(SaphyrYaml::file("config.yaml"));
        let recipient: String = figment.extract_inner("recipient")?;
        assert_eq!(recipient, "friend");
        Ok(())
    })
}

#[rstest]
#[case("conf/app.yml", "production", "conf/app.production.yml")]
#[case("app.json", "test", "app.test.json")]
#[case("app", "test", "app.test")]
#[case("app.tar.gz", "test", "app.tar.test.gz")]
fn environment_variants(#[case] base: &str, #[case] env: &str, #[case] expected: &str) {
    assert_eq!(environment_variant(Path::new(base), env), PathBuf::from(expected));
}

#[test]
fn resolve_prefers_base_and_override() -> Result<()> {
    with_jail(|jail| {
        jail.create_file("cfg.yaml", "APPName: cfg")?;
        jail.create_file("cfg.production.yaml", "APPName: cfg2")?;
        jail.create_file("cfg.example.yaml", "APPName: example")?;
        let candidates = resolve(Path::new("cfg.yaml"), "production").map_err(|e| e.to_string())?;
        assert_eq!(
            candidates,
            Candidates::Files(vec!["cfg.yaml".into(), "cfg.production.yaml".into()])
        );
        Ok(())
    })
}

#[test]
fn resolve_accepts_override_without_base() -> Result<()> {
    with_jail(|jail| {
        jail.create_file("cfg.production.yaml", "APPName: cfg2")?;
        let candidates = resolve(Path::new("cfg.yaml"), "production").map_err(|e| e.to_string())?;
        assert_eq!(candidates.paths(), [PathBuf::from("cfg.production.yaml")]);
        Ok(())
    })
}

#[test]
fn resolve_falls_back_to_example() -> Result<()> {
    with_jail(|jail| {
        jail.create_file("cfg.example.yaml", "APPName: example")?;
        let candidates = resolve(Path::new("cfg.yaml"), "production").map_err(|e| e.to_string())?;
        assert_eq!(candidates, Candidates::Example("cfg.example.yaml".into()));
        Ok(())
    })
}

#[test]
fn resolve_reports_missing_and_ignores_directories() -> Result<()> {
    with_jail(|jail| {
        std::fs::create_dir(jail.directory().join("cfg.yaml"))
            .map_err(|e| e.to_string())?;
        let candidates = resolve(Path::new("cfg.yaml"), "test").map_err(|e| e.to_string())?;
        assert_eq!(candidates, Candidates::Missing);
        assert!(candidates.paths().is_empty());
        Ok(())
    })
}

#[test]
fn load_file_returns_none_for_missing_files() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let loaded = to_anyhow(load_file(&dir.path().join("absent.json")))?;
    ensure!(loaded.is_none());
    Ok(())
}

#[test]
fn load_file_rejects_non_utf8_contents_as_undecodable() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, [b'k', b':', b' ', 0xff, 0xfe, b'\n'])?;
    let err = load_file(&path)
        .err()
        .ok_or_else(|| anyhow!("invalid UTF-8 should not load"))?;
    ensure!(
        matches!(err.as_ref(), ConfigError::Decode { path: reported, .. } if *reported == path),
        "got {err:?}"
    );
    Ok(())
}

#[test]
fn load_file_reports_unreadable_paths_as_io() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let err = load_file(dir.path())
        .err()
        .ok_or_else(|| anyhow!("a directory should not load"))?;
    ensure!(
        matches!(err.as_ref(), ConfigError::Io { path, .. } if path == dir.path()),
        "got {err:?}"
    );
    Ok(())
}

#[test]
fn load_file_decodes_existing_files() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config");
    std::fs::write(&path, TOML)?;
    let loaded = to_anyhow(load_file(&path))?;
    ensure!(loaded == Some(json!({"APPName": "demo", "DB": {"Port": 3306}})));
    Ok(())
}
