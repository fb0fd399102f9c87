//! Test helpers shared across the confstack workspace.
//!
//! - [`env`] mutates the process environment under a global lock and
//!   restores it when guards drop.
//! - [`figment`] runs setup inside a `figment::Jail` sandbox with a
//!   temporary working directory.

pub mod env;
pub mod figment;
