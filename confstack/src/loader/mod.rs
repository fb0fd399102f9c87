//! Loader settings and the load pipeline.
//!
//! A load builds the field schema, merges every resolved file over the
//! caller's record, overlays environment variables, applies defaults, checks
//! required fields and finally projects the merged record onto the target.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::defaults::{apply_defaults, check_required};
use crate::env::{self, EnvVars, Overlay};
use crate::file::{self, Candidates};
use crate::merge::merge_value;
use crate::validate::normalise;
use crate::{ConfigError, ConfigResult, ConfigResultExt, Configure, Schema, UnmatchedKeys};

/// Settings that shape a [`Loader`].
///
/// # Examples
///
/// ```
/// use confstack::{Loader, LoaderSettings};
///
/// let loader = Loader::new(
///     LoaderSettings::new()
///         .environment("production")
///         .env_prefix("APP")
///         .error_on_unmatched_keys(true),
/// );
/// assert_eq!(loader.environment(), "production");
/// assert!(loader.error_on_unmatched_keys());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoaderSettings {
    environment: Option<String>,
    env_prefix: Option<String>,
    error_on_unmatched_keys: bool,
    verbose: bool,
    debug: bool,
    silent: bool,
}

impl LoaderSettings {
    /// Settings with every option at its default.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            environment: None,
            env_prefix: None,
            error_on_unmatched_keys: false,
            verbose: false,
            debug: false,
            silent: false,
        }
    }

    /// Fix the environment name instead of detecting it.
    #[must_use]
    pub fn environment(mut self, name: impl Into<String>) -> Self {
        self.environment = Some(name.into());
        self
    }

    /// Use `prefix` for environment variable names; `-` disables prefixing.
    #[must_use]
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Fail when files or prefixed variables contain keys with no field.
    #[must_use]
    pub const fn error_on_unmatched_keys(mut self, strict: bool) -> Self {
        self.error_on_unmatched_keys = strict;
        self
    }

    /// Report the environment and loaded files at `info`.
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Report applied variables and the merged record at `info`. Implies
    /// verbose output.
    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Do not report configuration paths for which no file exists.
    #[must_use]
    pub const fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    const fn reports(&self) -> bool {
        self.verbose || self.debug
    }
}

/// Loads typed configuration from files and environment variables.
///
/// A loader owns its settings and an environment snapshot taken when it was
/// built; [`Loader::with_env`] replaces the snapshot.
#[derive(Clone, Debug)]
pub struct Loader {
    settings: LoaderSettings,
    env: EnvVars,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(LoaderSettings::default())
    }
}

impl Loader {
    /// Build a loader reading the current process environment.
    #[must_use]
    pub fn new(settings: LoaderSettings) -> Self {
        Self {
            settings,
            env: EnvVars::from_process(),
        }
    }

    /// Replace the environment snapshot.
    #[must_use]
    pub fn with_env(mut self, env: EnvVars) -> Self {
        self.env = env;
        self
    }

    /// The environment name this loader resolves override files for.
    #[must_use]
    pub fn environment(&self) -> String {
        env::resolve_environment(self.settings.environment.as_deref(), &self.env)
    }

    /// Whether unknown keys are errors.
    #[must_use]
    pub const fn error_on_unmatched_keys(&self) -> bool {
        self.settings.error_on_unmatched_keys
    }

    /// Load `paths` and the environment into `target`.
    ///
    /// Values already in `target` act as the lowest layer. `target` is only
    /// written when loading succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a declaration is malformed, a file
    /// cannot be read or decoded, a value cannot be converted, required
    /// fields are blank, strict mode finds unknown keys, or the merged record
    /// does not fit `T`.
    pub fn load<T, I, P>(&self, target: &mut T, paths: I) -> ConfigResult<()>
    where
        T: Configure,
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let schema = Schema::of::<T>()?;
        let environment = self.environment();
        let prefix = env::resolve_prefix(
            self.settings.env_prefix.as_deref(),
            &self.env,
            T::env_prefix(),
        );
        let shown_prefix = prefix.as_deref().unwrap_or(env::NO_PREFIX);
        if self.settings.reports() {
            info!(%environment, prefix = shown_prefix, "loading configuration");
        } else {
            debug!(%environment, prefix = shown_prefix, "loading configuration");
        }

        let mut record = serde_json::to_value(&*target).into_config()?;
        let mut unmatched = Vec::new();
        for path in paths {
            self.merge_path(&schema, path.as_ref(), &environment, &mut record, &mut unmatched)?;
        }

        let mut overlay = Overlay::new(&self.env, prefix.as_deref(), self.settings.debug);
        let applied = overlay.apply(&schema, &mut record)?;
        debug!(applied, "applied environment variables");

        apply_defaults(&schema, &mut record)?;
        check_required(&schema, &record)?;

        if self.settings.error_on_unmatched_keys {
            unmatched.extend(overlay.unmatched());
            if !unmatched.is_empty() {
                dedup_in_order(&mut unmatched);
                return Err(Arc::new(ConfigError::UnmatchedKeys(UnmatchedKeys::new(
                    unmatched,
                ))));
            }
        }

        if self.settings.debug {
            info!(record = %record, "merged configuration");
        } else {
            trace!(record = %record, "merged configuration");
        }
        *target = serde_json::from_value(record).into_config()?;
        Ok(())
    }

    /// Load `paths` and the environment into a fresh `T::default()`.
    ///
    /// # Errors
    ///
    /// See [`Loader::load`].
    pub fn load_from<T, I, P>(&self, paths: I) -> ConfigResult<T>
    where
        T: Configure + Default,
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut target = T::default();
        self.load(&mut target, paths)?;
        Ok(target)
    }

    fn merge_path(
        &self,
        schema: &Schema,
        path: &Path,
        environment: &str,
        record: &mut Value,
        unmatched: &mut Vec<String>,
    ) -> ConfigResult<()> {
        let candidates = file::resolve(path, environment)?;
        match &candidates {
            Candidates::Example(example) => {
                warn!(
                    path = %path.display(),
                    example = %example.display(),
                    "configuration file missing, using example file"
                );
            }
            Candidates::Missing if !self.settings.silent => {
                if self.settings.reports() {
                    info!(path = %path.display(), "configuration file not found, skipping");
                } else {
                    debug!(path = %path.display(), "configuration file not found, skipping");
                }
            }
            Candidates::Missing | Candidates::Files(_) => {}
        }
        for file in candidates.paths() {
            self.merge_file(schema, file, record, unmatched)?;
        }
        Ok(())
    }

    fn merge_file(
        &self,
        schema: &Schema,
        file: &Path,
        record: &mut Value,
        unmatched: &mut Vec<String>,
    ) -> ConfigResult<()> {
        let Some(mut decoded) = file::load_file(file)? else {
            return Ok(());
        };
        if self.settings.reports() {
            info!(path = %file.display(), "loading configuration file");
        } else {
            debug!(path = %file.display(), "loading configuration file");
        }
        let before = unmatched.len();
        normalise(schema, &mut decoded, unmatched)?;
        if let Some(extra) = unmatched.get(before..).filter(|extra| !extra.is_empty()) {
            debug!(path = %file.display(), keys = ?extra, "ignoring unknown keys");
        }
        merge_value(record, decoded);
        Ok(())
    }
}

fn dedup_in_order(keys: &mut Vec<String>) {
    let mut seen = std::collections::BTreeSet::new();
    keys.retain(|key| seen.insert(key.clone()));
}

/// Load `paths` into `target` with default settings and the process
/// environment.
///
/// # Errors
///
/// See [`Loader::load`].
pub fn load<T, I, P>(target: &mut T, paths: I) -> ConfigResult<()>
where
    T: Configure,
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    Loader::default().load(target, paths)
}

/// Load `paths` into a fresh `T::default()` with default settings and the
/// process environment.
///
/// # Errors
///
/// See [`Loader::load`].
pub fn load_from<T, I, P>(paths: I) -> ConfigResult<T>
where
    T: Configure + Default,
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    Loader::default().load_from(paths)
}

/// The environment name resolved from the process environment.
#[must_use]
pub fn environment() -> String {
    env::resolve_environment(None, &EnvVars::from_process())
}
