//! Environment variables layered over files through the loader.

mod common;

use std::time::Duration;

use anyhow::{Result, ensure};
use common::{TestConfig, load, load_err, loader};
use confstack::{ConfigError, Configure, LoaderSettings};
use rstest::rstest;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

const PASSWORD: (&str, &str) = ("DBPassword", "secret");

fn load_env(settings: LoaderSettings, vars: &[(&str, &str)]) -> Result<TestConfig> {
    let mut all = vars.to_vec();
    all.push(PASSWORD);
    load::<TestConfig, &str>(&loader(settings, &all), &[])
}

#[rstest]
#[case::verbatim("CONFIG_APPName")]
#[case::upper("CONFIG_APPNAME")]
fn default_prefix_reads_both_cases(#[case] name: &str) -> Result<()> {
    let loaded = load_env(LoaderSettings::new(), &[(name, "from-env")])?;
    ensure!(loaded.app_name == "from-env");
    Ok(())
}

#[test]
fn verbatim_name_wins_over_upper_case() -> Result<()> {
    let loaded = load_env(
        LoaderSettings::new(),
        &[("CONFIG_DB_Name", "verbatim"), ("CONFIG_DB_NAME", "upper")],
    )?;
    ensure!(loaded.db.name == "verbatim");
    Ok(())
}

#[rstest]
#[case::variable_lower(LoaderSettings::new(), ("CONFIG_ENV_PREFIX", "app"), "app_DB_Name")]
#[case::variable_upper(LoaderSettings::new(), ("CONFIG_ENV_PREFIX", "app"), "APP_DB_NAME")]
#[case::settings(LoaderSettings::new().env_prefix("APP1"), ("UNRELATED", "x"), "APP1_DB_NAME")]
#[case::variable_dash(LoaderSettings::new(), ("CONFIG_ENV_PREFIX", "-"), "DB_NAME")]
#[case::settings_dash(LoaderSettings::new().env_prefix("-"), ("UNRELATED", "x"), "DB_Name")]
fn prefix_selection(
    #[case] settings: LoaderSettings,
    #[case] control: (&str, &str),
    #[case] name: &str,
) -> Result<()> {
    let loaded = load_env(settings, &[control, (name, "prefixed"), ("CONFIG_DB_NAME", "default")])?;
    ensure!(loaded.db.name == "prefixed", "got {}", loaded.db.name);
    Ok(())
}

#[test]
fn environment_overrides_file_values() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "APPName: file\nDB:\n  Name: file-db\n  Password: p\n")?;
    let loaded: TestConfig = load(
        &loader(LoaderSettings::new(), &[("CONFIG_APPNAME", "env")]),
        &[path],
    )?;
    ensure!(loaded.app_name == "env");
    ensure!(loaded.db.name == "file-db");
    Ok(())
}

#[test]
fn anonymous_fields_have_no_segment_of_their_own() -> Result<()> {
    let loaded = load_env(
        LoaderSettings::new(),
        &[("CONFIG_ANONYMOUS_DESCRIPTION", "nested")],
    )?;
    ensure!(loaded.anonymous.description.is_empty());
    let loaded = load_env(LoaderSettings::new(), &[("CONFIG_DESCRIPTION", "promoted")])?;
    ensure!(loaded.anonymous.description == "promoted");
    Ok(())
}

#[test]
fn multi_line_values_are_kept_verbatim() -> Result<()> {
    let text = "-----BEGIN KEY-----\nline one\nline two\n-----END KEY-----\n";
    let loaded = load_env(LoaderSettings::new(), &[("CONFIG_DESCRIPTION", text)])?;
    ensure!(loaded.anonymous.description == text);
    Ok(())
}

#[derive(Debug, Default, Deserialize, Serialize, Configure)]
#[config(prefix = "FLAGS")]
struct Flags {
    enabled: bool,
}

#[rstest]
#[case("1", true)]
#[case("on", true)]
#[case("Yes", true)]
#[case("FALSE", false)]
#[case("n", false)]
fn booleans_accept_common_spellings(#[case] raw: &str, #[case] expected: bool) -> Result<()> {
    let loaded: Flags =
        load::<_, &str>(&loader(LoaderSettings::new(), &[("FLAGS_ENABLED", raw)]), &[])?;
    ensure!(loaded.enabled == expected);
    Ok(())
}

#[test]
fn false_does_not_override_a_true_default() -> Result<()> {
    let loaded = load_env(LoaderSettings::new(), &[("CONFIG_DB_SSL", "false")])?;
    ensure!(loaded.db.ssl);
    Ok(())
}

#[test]
fn unparsable_values_name_the_variable() -> Result<()> {
    let err = load_err::<TestConfig, &str>(
        &loader(LoaderSettings::new(), &[PASSWORD, ("CONFIG_DB_PORT", "eighty")]),
        &[],
    )?;
    let ConfigError::Conversion { key, value, .. } = err.as_ref() else {
        anyhow::bail!("expected a conversion error, got {err}");
    };
    ensure!(key == "CONFIG_DB_PORT");
    ensure!(value == "eighty");
    Ok(())
}

#[derive(Debug, Default, Deserialize, Serialize, Configure)]
struct Narrow {
    port: u8,
}

#[rstest]
#[case("300")]
#[case("-1")]
fn values_outside_the_integer_width_are_rejected(#[case] raw: &str) -> Result<()> {
    let err =
        load_err::<Narrow, &str>(&loader(LoaderSettings::new(), &[("CONFIG_PORT", raw)]), &[])?;
    ensure!(
        matches!(err.as_ref(), ConfigError::Conversion { key, value, .. }
            if key == "CONFIG_PORT" && value == raw),
        "got {err}"
    );
    Ok(())
}

const fn seven() -> u32 {
    7
}

#[derive(Debug, Default, Deserialize, Serialize, Configure)]
struct Renamed {
    #[serde(default = "seven", rename = "Port")]
    port: u32,
}

#[test]
fn rename_following_a_valued_serde_key_names_the_variable() -> Result<()> {
    let loaded: Renamed =
        load::<_, &str>(&loader(LoaderSettings::new(), &[("CONFIG_Port", "9")]), &[])?;
    ensure!(loaded.port == 9);
    Ok(())
}

#[rstest]
#[case::comma_separated("http://a, http://b")]
#[case::flow_sequence("[http://a, http://b]")]
#[case::block_sequence("- http://a\n- http://b\n")]
fn scalar_lists_parse_from_one_variable(#[case] raw: &str) -> Result<()> {
    let loaded = load_env(LoaderSettings::new(), &[("CONFIG_HOSTS", raw)])?;
    ensure!(loaded.hosts == ["http://a", "http://b"], "got {:?}", loaded.hosts);
    Ok(())
}

#[test]
fn struct_documents_merge_over_file_values() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"DB": {"Name": "file", "Port": 1234, "Password": "p"}}"#)?;
    let loaded: TestConfig = load(
        &loader(LoaderSettings::new(), &[("CONFIG_DB", r#"{"Name": "doc"}"#)]),
        &[path],
    )?;
    ensure!(loaded.db.name == "doc");
    ensure!(loaded.db.port == 1234);
    Ok(())
}

#[test]
fn contacts_are_built_from_indexed_variables() -> Result<()> {
    let loaded = load_env(
        LoaderSettings::new(),
        &[
            ("CONFIG_CONTACTS_0_NAME", "first"),
            ("CONFIG_CONTACTS_0_EMAIL", "first@example.com"),
            ("CONFIG_CONTACTS_1_EMAIL", "second@example.com"),
        ],
    )?;
    let emails: Vec<&str> = loaded.contacts.iter().map(|c| c.email.as_str()).collect();
    ensure!(emails == ["first@example.com", "second@example.com"]);
    ensure!(loaded.contacts.first().is_some_and(|c| c.name == "first"));
    Ok(())
}

#[derive(Debug, Default, PartialEq, Deserialize, Serialize, Configure)]
#[serde(rename_all = "PascalCase")]
struct Test2Ele {
    test2_ele1: i64,
    test2_ele2: i64,
}

#[derive(Debug, Default, PartialEq, Deserialize, Serialize, Configure)]
#[serde(rename_all = "PascalCase")]
struct SliceConfig {
    test2: Vec<Test2Ele>,
}

#[test]
fn slices_of_structs_are_rebuilt_in_index_order() -> Result<()> {
    let loaded: SliceConfig = load::<_, &str>(
        &loader(
            LoaderSettings::new().env_prefix("PREFIX"),
            &[
                ("PREFIX_TEST2_0_TEST2ELE1", "1"),
                ("PREFIX_TEST2_0_TEST2ELE2", "2"),
                ("PREFIX_TEST2_1_TEST2ELE1", "3"),
                ("PREFIX_TEST2_1_TEST2ELE2", "4"),
                ("PREFIX_TEST2_3_TEST2ELE1", "after a gap"),
            ],
        ),
        &[],
    )?;
    ensure!(
        loaded.test2
            == [
                Test2Ele { test2_ele1: 1, test2_ele2: 2 },
                Test2Ele { test2_ele1: 3, test2_ele2: 4 },
            ],
        "got {:?}",
        loaded.test2
    );
    Ok(())
}

#[derive(Debug, Default, PartialEq, Deserialize, Serialize, Configure)]
#[config(prefix = "SVC")]
struct Service {
    timeout: Duration,
    deadline: Option<chrono::DateTime<chrono::FixedOffset>>,
    weights: Vec<f64>,
}

#[test]
fn durations_and_times_parse_from_text() -> Result<()> {
    let loaded: Service = load::<_, &str>(
        &loader(
            LoaderSettings::new(),
            &[
                ("SVC_TIMEOUT", "1h30m15.5s"),
                ("SVC_DEADLINE", "2025-06-01T12:00:00+02:00"),
                ("SVC_WEIGHTS", "0.5,1.5"),
            ],
        ),
        &[],
    )?;
    ensure!(loaded.timeout == Duration::from_millis(5_415_500));
    ensure!(loaded.deadline.map(|at| at.timestamp()) == Some(1_748_772_000));
    ensure!(loaded.weights.len() == 2);
    Ok(())
}

#[test]
fn declared_prefix_yields_to_the_prefix_variable() -> Result<()> {
    let loaded: Service = load::<_, &str>(
        &loader(
            LoaderSettings::new(),
            &[("CONFIG_ENV_PREFIX", "OTHER"), ("OTHER_TIMEOUT", "2s"), ("SVC_TIMEOUT", "9s")],
        ),
        &[],
    )?;
    ensure!(loaded.timeout == Duration::from_secs(2));
    Ok(())
}
