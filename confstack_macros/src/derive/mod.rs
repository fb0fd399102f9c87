//! Expansion of `#[derive(Configure)]`.

use proc_macro2::TokenStream;
use syn::DeriveInput;

mod crate_path;
mod generate;
mod parse;

/// Parse `input` and generate its `Configure` and `ConfigValue` impls.
pub(crate) fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let parsed = parse::parse_input(input)?;
    Ok(generate::configure_impl(input, &parsed))
}
