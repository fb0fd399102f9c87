//! Rejection of keys and variables that no field declares.

mod common;

use anyhow::{Result, ensure};
use common::{TestConfig, load, load_err, loader};
use confstack::{ConfigError, LoaderSettings};
use rstest::rstest;
use tempfile::TempDir;

const STRICT: LoaderSettings = LoaderSettings::new().error_on_unmatched_keys(true);

#[rstest]
#[case::json("config.json", r#"{"DB": {"Password": "p"}, "Test": 1}"#)]
#[case::yaml("config.yaml", "DB:\n  Password: p\nTest: 1\n")]
#[case::toml("config.toml", "Test = 1\n[DB]\nPassword = \"p\"\n")]
fn unknown_top_level_key_is_reported(#[case] name: &str, #[case] contents: &str) -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join(name);
    std::fs::write(&path, contents)?;

    let err = load_err::<TestConfig, _>(&loader(STRICT, &[]), &[&path])?;
    ensure!(err.unmatched_keys() == Some(&["Test".to_owned()][..]), "got {err}");

    let loaded: TestConfig = load(&loader(LoaderSettings::new(), &[]), &[&path])?;
    ensure!(loaded.db.password == "p");
    Ok(())
}

#[test]
fn nested_and_list_keys_are_reported_with_their_path() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("config.yaml");
    std::fs::write(
        &path,
        "Zone: eu\nDB:\n  Password: p\n  Host: db\n\
         Contacts:\n  - Email: a@x\n  - Email: b@x\n    Phone: 1\n",
    )?;
    let err = load_err::<TestConfig, _>(&loader(STRICT, &[]), &[&path])?;
    let ConfigError::UnmatchedKeys(keys) = err.as_ref() else {
        anyhow::bail!("expected unmatched keys, got {err}");
    };
    // Depth-first, in key order.
    ensure!(
        keys.keys() == ["Contacts.1.Phone", "DB.Host", "Zone"],
        "got {:?}",
        keys.keys()
    );
    Ok(())
}

#[test]
fn differently_cased_keys_are_not_unknown() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"appname": "x", "db": {"PASSWORD": "p"}}"#)?;
    let loaded: TestConfig = load(&loader(STRICT, &[]), &[path])?;
    ensure!(loaded.app_name == "x");
    ensure!(loaded.db.password == "p");
    Ok(())
}

#[test]
fn unknown_prefixed_variables_are_reported() -> Result<()> {
    let vars = [
        ("DBPassword", "p"),
        ("CONFIG_ENV", "development"),
        ("CONFIG_DB_PORT", "1"),
        ("CONFIG_DB_HOST", "db"),
        ("config_extra", "1"),
        ("OTHER_VALUE", "ignored"),
    ];
    let err = load_err::<TestConfig, &str>(&loader(STRICT, &vars), &[])?;
    ensure!(
        err.unmatched_keys() == Some(&["CONFIG_DB_HOST".to_owned(), "config_extra".to_owned()][..]),
        "got {err}"
    );
    Ok(())
}

#[test]
fn variables_are_not_checked_without_a_prefix() -> Result<()> {
    let loaded: TestConfig = load::<_, &str>(
        &loader(
            LoaderSettings::new().error_on_unmatched_keys(true).env_prefix("-"),
            &[("DBPassword", "p"), ("ANYTHING", "else"), ("APPName", "bare")],
        ),
        &[],
    )?;
    ensure!(loaded.app_name == "bare");
    Ok(())
}

#[test]
fn file_and_variable_keys_are_combined() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "DB:\n  Password: p\nTest: 1\n")?;
    let err = load_err::<TestConfig, _>(
        &loader(STRICT, &[("CONFIG_UNKNOWN", "1")]),
        &[&path, &path],
    )?;
    ensure!(
        err.unmatched_keys() == Some(&["Test".to_owned(), "CONFIG_UNKNOWN".to_owned()][..]),
        "got {err}"
    );
    Ok(())
}
