//! Process environment guards for tests.
//!
//! The package-level loaders read the live process environment, so tests of
//! them have to change it. Every mutation here happens under one global
//! re-entrant lock and returns a guard that restores the previous value when
//! dropped. Stacked guards for one key restore in LIFO order.
//!
//! Tests that set several variables should hold an [`EnvScope`], which keeps
//! the lock until the scope drops so no other test sees a half-built
//! environment.
//!
//! # Examples
//!
//! ```
//! use test_helpers::env;
//!
//! let _scope = env::scope([("APP_DB_PORT", "5432"), ("APP_DB_USER", "root")]);
//! assert_eq!(std::env::var("APP_DB_PORT").as_deref(), Ok("5432"));
//! ```

use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::sync::LazyLock;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

static ENV_MUTEX: LazyLock<ReentrantMutex<()>> = LazyLock::new(ReentrantMutex::default);

/// Restores one environment variable to its prior value on drop.
#[must_use = "dropping restores the prior value"]
pub struct EnvVarGuard {
    key: String,
    original: Option<OsString>,
}

impl fmt::Debug for EnvVarGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvVarGuard")
            .field("key", &self.key)
            .field("had_original", &self.original.is_some())
            .finish()
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        let _lock = ENV_MUTEX.lock();
        if let Some(value) = self.original.take() {
            // SAFETY: ENV_MUTEX is held.
            unsafe { env::set_var(&self.key, value) };
        } else {
            // SAFETY: ENV_MUTEX is held.
            unsafe { env::remove_var(&self.key) };
        }
    }
}

/// Holds the global environment lock; mutations made through it do not
/// re-acquire the lock.
#[must_use = "dropping releases the environment lock"]
pub struct EnvLock {
    _guard: ReentrantMutexGuard<'static, ()>,
}

impl EnvLock {
    /// Set `key` while the lock is held.
    pub fn set_var(&self, key: impl Into<String>, value: impl AsRef<OsStr>) -> EnvVarGuard {
        let key = key.into();
        let original = env::var_os(&key);
        // SAFETY: the lock is held for `self`'s lifetime.
        unsafe { env::set_var(&key, value) };
        EnvVarGuard { key, original }
    }

    /// Remove `key` while the lock is held.
    pub fn remove_var(&self, key: impl Into<String>) -> EnvVarGuard {
        let key = key.into();
        let original = env::var_os(&key);
        // SAFETY: the lock is held for `self`'s lifetime.
        unsafe { env::remove_var(&key) };
        EnvVarGuard { key, original }
    }
}

/// Keeps the lock and a set of guards alive together.
///
/// Guards are restored before the lock is released.
#[must_use = "dropping restores the variables and releases the lock"]
pub struct EnvScope {
    guards: Vec<EnvVarGuard>,
    _lock: EnvLock,
}

impl EnvScope {
    /// Add another guard to the scope.
    pub fn push(&mut self, guard: EnvVarGuard) {
        self.guards.push(guard);
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        while let Some(guard) = self.guards.pop() {
            drop(guard);
        }
    }
}

/// Acquire the global environment lock.
pub fn lock() -> EnvLock {
    EnvLock {
        _guard: ENV_MUTEX.lock(),
    }
}

/// Set `key` to `value` until the guard drops.
///
/// ```
/// use test_helpers::env;
///
/// let guard = env::set_var("CONFSTACK_DOC_PROBE", "on");
/// assert_eq!(std::env::var("CONFSTACK_DOC_PROBE").as_deref(), Ok("on"));
/// drop(guard);
/// assert!(std::env::var("CONFSTACK_DOC_PROBE").is_err());
/// ```
pub fn set_var(key: impl Into<String>, value: impl AsRef<OsStr>) -> EnvVarGuard {
    lock().set_var(key, value)
}

/// Remove `key` until the guard drops.
pub fn remove_var(key: impl Into<String>) -> EnvVarGuard {
    lock().remove_var(key)
}

/// Set every pair in `vars` and hold the lock until the scope drops.
pub fn scope<I, K, V>(vars: I) -> EnvScope
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<OsStr>,
{
    scope_with(|lock| {
        vars.into_iter()
            .map(|(key, value)| lock.set_var(key, value))
            .collect()
    })
}

/// Build a scope from guards created through the held lock.
///
/// ```
/// use test_helpers::env;
///
/// let _scope = env::scope_with(|lock| {
///     vec![lock.remove_var("CONFIG_ENV"), lock.set_var("CONFIG_ENV_PREFIX", "-")]
/// });
/// ```
pub fn scope_with<F>(build: F) -> EnvScope
where
    F: FnOnce(&EnvLock) -> Vec<EnvVarGuard>,
{
    let held = lock();
    let guards = build(&held);
    EnvScope {
        guards,
        _lock: held,
    }
}
