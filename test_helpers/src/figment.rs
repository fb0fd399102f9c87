//! Helpers for running tests inside a `figment::Jail`.
//!
//! A jail gives the closure a fresh temporary working directory and
//! restores environment variables set through it, so relative configuration
//! paths such as `config.yml` can be exercised without touching the real
//! working directory.

use anyhow::{Result, anyhow};

/// Run `f` inside a [`figment::Jail`] and return its output.
///
/// The jail is torn down once the closure finishes, including on error.
///
/// # Errors
///
/// Returns an error if the jail cannot be created or the closure fails.
///
/// # Examples
///
/// ```
/// let contents = test_helpers::figment::with_jail(|jail| {
///     jail.create_file("config.yml", "name: demo")?;
///     std::fs::read_to_string("config.yml").map_err(test_helpers::figment::jail_error)
/// })?;
/// assert_eq!(contents, "name: demo");
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn with_jail<F, T>(f: F) -> Result<T>
where
    F: FnOnce(&mut figment::Jail) -> figment::error::Result<T>,
{
    let mut output = None;
    figment::Jail::try_with(|jail| {
        output = Some(f(jail)?);
        Ok(())
    })
    .map_err(|err| anyhow!(err.to_string()))?;
    output.ok_or_else(|| anyhow!("jail closure produced no value"))
}

/// Convert any displayable error into a [`figment::Error`] for use with `?`
/// inside a jail closure.
#[expect(
    clippy::needless_pass_by_value,
    reason = "used as a `map_err` callback, which passes errors by value"
)]
#[must_use]
pub fn jail_error(err: impl std::fmt::Display) -> figment::Error {
    figment::Error::from(err.to_string())
}
