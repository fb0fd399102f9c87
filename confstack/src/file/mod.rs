//! Locating and decoding configuration files.

mod format;
mod loader;
mod path;
#[cfg(feature = "yaml")]
mod yaml;

pub use format::{Format, decode};
pub use loader::{Candidates, load_file, resolve};
pub use path::{EXAMPLE_ENVIRONMENT, environment_variant, example_variant};
#[cfg(feature = "yaml")]
pub use yaml::SaphyrYaml;

#[cfg(test)]
mod tests;
