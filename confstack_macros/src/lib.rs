//! Procedural macros for `confstack`.
//!
//! `#[derive(Configure)]` implements `confstack::Configure` and
//! `confstack::ConfigValue` for a struct with named fields. Each field is
//! declared under the key serde uses for it, so `#[serde(rename)]` and
//! `#[serde(rename_all)]` carry over to file keys and environment variable
//! names.
//!
//! Field attributes, written `#[config(...)]`:
//!
//! - `default = <literal>` fills the field when it is still zero after every
//!   source. Strings, integers, floats and booleans are accepted.
//! - `required` fails the load when the field is still zero.
//! - `env = "NAME"` reads the field from `NAME` instead of the prefixed name.
//! - `skip` leaves the field out of loading entirely.
//!
//! Fields marked `#[serde(flatten)]` are anonymous: their children appear at
//! the parent's level. Fields marked `#[serde(skip)]` or
//! `#[serde(skip_deserializing)]` are left out.
//!
//! Container attributes: `#[config(prefix = "APP")]` declares the default
//! environment variable prefix and `#[config(crate = "path")]` renames the
//! runtime crate in generated code.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod derive;

/// Derive macro for `confstack::Configure`.
#[proc_macro_derive(Configure, attributes(config))]
pub fn derive_configure(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
