//! Environment snapshots, prefix and environment-name resolution, and the
//! overlay of environment variables onto configuration records.

pub(crate) mod convert;
mod overlay;

use std::collections::BTreeMap;
use std::path::Path;

pub use convert::convert;
pub(crate) use overlay::Overlay;

/// Selects the active environment name (`production`, `test`, ...).
pub const CONFIG_ENV: &str = "CONFIG_ENV";

/// Overrides the environment variable prefix; `-` disables prefixing.
pub const CONFIG_ENV_PREFIX: &str = "CONFIG_ENV_PREFIX";

/// Prefix used when nothing else provides one.
pub const DEFAULT_ENV_PREFIX: &str = "CONFIG";

/// Prefix value that disables prefixing.
pub const NO_PREFIX: &str = "-";

/// Environment name used inside test harnesses when `CONFIG_ENV` is unset.
pub const TEST_ENVIRONMENT: &str = "test";

/// Environment name used otherwise.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Immutable snapshot of environment variables.
///
/// Loading reads variables from a snapshot rather than the live process
/// table, so tests can supply their own variables without touching global
/// state.
///
/// ```
/// use confstack::EnvVars;
///
/// let env = EnvVars::new().with("CONFIG_DB_PORT", "5432").with("EMPTY", "");
/// assert_eq!(env.get("CONFIG_DB_PORT"), Some("5432"));
/// assert_eq!(env.get("EMPTY"), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvVars {
    vars: BTreeMap<String, String>,
}

impl EnvVars {
    /// An empty snapshot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vars: BTreeMap::new(),
        }
    }

    /// Capture the current process environment. Variables whose name or
    /// value is not valid UTF-8 are skipped.
    #[must_use]
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    /// Add or replace a variable.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Value of `name`. Empty values count as unset.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Iterate over every variable, including empty ones, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Whether any non-empty variable starts with `head`, compared
    /// ASCII case-insensitively.
    #[must_use]
    pub fn any_starting_with(&self, head: &str) -> bool {
        self.iter()
            .any(|(name, value)| !value.is_empty() && starts_with_ignore_case(name, head))
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvVars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut env = Self::new();
        env.extend(iter);
        env
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for EnvVars {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.vars
            .extend(iter.into_iter().map(|(name, value)| (name.into(), value.into())));
    }
}

pub(crate) fn starts_with_ignore_case(name: &str, head: &str) -> bool {
    name.get(..head.len())
        .is_some_and(|start| start.eq_ignore_ascii_case(head))
}

/// Resolve the environment variable prefix.
///
/// The first of `configured`, `CONFIG_ENV_PREFIX` and `declared` that is
/// set wins, falling back to [`DEFAULT_ENV_PREFIX`]. `-` yields `None`;
/// trailing underscores are dropped.
///
/// ```
/// use confstack::{EnvVars, env::resolve_prefix};
///
/// let env = EnvVars::new();
/// assert_eq!(resolve_prefix(None, &env, None).as_deref(), Some("CONFIG"));
/// assert_eq!(resolve_prefix(Some("APP_"), &env, None).as_deref(), Some("APP"));
/// assert_eq!(resolve_prefix(Some("-"), &env, Some("APP")), None);
/// ```
#[must_use]
pub fn resolve_prefix(
    configured: Option<&str>,
    env: &EnvVars,
    declared: Option<&str>,
) -> Option<String> {
    let raw = configured
        .filter(|prefix| !prefix.is_empty())
        .or_else(|| env.get(CONFIG_ENV_PREFIX))
        .or_else(|| declared.filter(|prefix| !prefix.is_empty()))
        .unwrap_or(DEFAULT_ENV_PREFIX);
    if raw == NO_PREFIX {
        return None;
    }
    let trimmed = raw.trim_end_matches('_');
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Resolve the active environment name.
///
/// `configured` wins, then `CONFIG_ENV`. Otherwise the name is `"test"`
/// inside a cargo test harness and `"development"` elsewhere.
#[must_use]
pub fn resolve_environment(configured: Option<&str>, env: &EnvVars) -> String {
    configured
        .filter(|name| !name.is_empty())
        .or_else(|| env.get(CONFIG_ENV))
        .map_or_else(
            || {
                if running_under_test_harness() {
                    TEST_ENVIRONMENT.to_owned()
                } else {
                    DEFAULT_ENVIRONMENT.to_owned()
                }
            },
            str::to_owned,
        )
}

/// Cargo places test binaries in a `deps` directory.
fn running_under_test_harness() -> bool {
    std::env::current_exe()
        .ok()
        .as_deref()
        .and_then(Path::parent)
        .and_then(Path::file_name)
        .is_some_and(|dir| dir == "deps")
}
