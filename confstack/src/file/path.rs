//! Sibling file names derived from a configuration path.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Name of the sibling file used when neither a configuration file nor its
/// environment override exists.
pub const EXAMPLE_ENVIRONMENT: &str = "example";

/// Insert `environment` before the extension of `path`, or append it when
/// there is none.
///
/// ```
/// use confstack::file::environment_variant;
/// use std::path::Path;
///
/// assert_eq!(
///     environment_variant(Path::new("conf/app.yml"), "production"),
///     Path::new("conf/app.production.yml"),
/// );
/// assert_eq!(
///     environment_variant(Path::new("conf/app"), "production"),
///     Path::new("conf/app.production"),
/// );
/// ```
#[must_use]
pub fn environment_variant(path: &Path, environment: &str) -> PathBuf {
    match path.extension() {
        Some(ext) => {
            let mut extension = OsString::from(environment);
            extension.push(".");
            extension.push(ext);
            path.with_extension(extension)
        }
        None => path.with_extension(environment),
    }
}

/// The example file for `path`, such as `app.example.yml`.
#[must_use]
pub fn example_variant(path: &Path) -> PathBuf {
    environment_variant(path, EXAMPLE_ENVIRONMENT)
}
